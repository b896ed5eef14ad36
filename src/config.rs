use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::routes::{LOGIN_PATH, names};

/// ConfigError
///
/// A setting that is present but unusable. Missing optional settings fall
/// back to defaults instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got `{value}`")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
    #[error("{0} must be an absolute path starting with `/`")]
    RelativeLoginPath(String),
    #[error("NAV_SESSION_FILE is a local development aid and cannot be used in production")]
    SessionFileInProduction,
    #[error("home route `{0}` is not in the route table")]
    UnknownHomeRoute(String),
    #[error("home route `{0}` must render a view, not redirect")]
    HomeRouteNotAView(String),
    #[error("home route `{route}` needs param `{param}` and cannot be reached by name alone")]
    HomeRouteNeedsParams { route: String, param: String },
    #[error("home route `{0}` is an auth screen and would bounce signed-in users back to itself")]
    HomeRouteIsAuthScreen(String),
    #[error("login path `{0}` must resolve to a view that does not require a token")]
    LoginPathNotPublicView(String),
}

/// NavConfig
///
/// Immutable configuration of the navigation service, loaded once at startup
/// and shared through the application state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavConfig {
    // Runtime environment marker. Controls log format and the session-file fallback.
    pub env: Env,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // Key under which the login flow persists the token.
    pub token_key: String,
    // Upper bound on redirects followed by one navigation.
    pub max_redirects: usize,
    // Local-only session store consulted when a request carries no bearer token.
    pub session_file: Option<PathBuf>,
    // Where the auth-required guard sends unauthenticated navigations.
    pub login_path: String,
    // Route name an authenticated session lands on instead of Login/Register.
    pub home_route: String,
}

/// Env
///
/// Runtime context: `Local` enables pretty logs and the session-file fallback,
/// `Production` switches to JSON logs and bearer tokens only.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "0.0.0.0:3000".to_string(),
            token_key: "jwtToken".to_string(),
            max_redirects: 10,
            session_file: None,
            login_path: LOGIN_PATH.to_string(),
            home_route: names::MAIN_PAGE.to_string(),
        }
    }
}

impl NavConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call
    /// `dotenv::dotenv()` first to pick up a `.env` file). Unset variables take
    /// the defaults; set-but-invalid ones are rejected.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let max_redirects = match env::var("NAV_MAX_REDIRECTS") {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "NAV_MAX_REDIRECTS",
                        value,
                    });
                }
            },
            Err(_) => defaults.max_redirects,
        };

        let login_path = non_empty("NAV_LOGIN_PATH")?.unwrap_or(defaults.login_path);
        if !login_path.starts_with('/') {
            return Err(ConfigError::RelativeLoginPath(login_path));
        }

        let session_file = env::var("NAV_SESSION_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        if env == Env::Production && session_file.is_some() {
            return Err(ConfigError::SessionFileInProduction);
        }

        Ok(Self {
            env,
            bind_addr: non_empty("NAV_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            token_key: non_empty("NAV_TOKEN_KEY")?.unwrap_or(defaults.token_key),
            max_redirects,
            session_file,
            login_path,
            home_route: non_empty("NAV_HOME_ROUTE")?.unwrap_or(defaults.home_route),
        })
    }
}

/// Unset is fine (`None`); set to blanks is a mistake.
fn non_empty(var: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(_) => Ok(None),
    }
}
