use portal_nav::{
    AppState, NavConfig,
    auth::BearerToken,
    config::{ConfigError, Env},
    models::ViewId,
    routes,
};
use serial_test::serial;
use std::{env, panic, path::PathBuf};

const VARS: [&str; 7] = [
    "APP_ENV",
    "NAV_BIND_ADDR",
    "NAV_TOKEN_KEY",
    "NAV_MAX_REDIRECTS",
    "NAV_SESSION_FILE",
    "NAV_LOGIN_PATH",
    "NAV_HOME_ROUTE",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly `vars` set (every other navigation variable
/// cleared) and restores the previous environment afterwards.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_config_defaults_when_unset() {
    let config = run_with_env(&[], NavConfig::load).unwrap();
    assert_eq!(config, NavConfig::default());
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.token_key, "jwtToken");
    assert_eq!(config.login_path, "/login");
    assert_eq!(config.home_route, "MainPage");
}

#[test]
#[serial]
fn test_config_reads_overrides() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("NAV_BIND_ADDR", "127.0.0.1:8080"),
            ("NAV_TOKEN_KEY", "sessionToken"),
            ("NAV_MAX_REDIRECTS", "4"),
        ],
        NavConfig::load,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.token_key, "sessionToken");
    assert_eq!(config.max_redirects, 4);
    assert_eq!(config.session_file, None);
}

#[test]
#[serial]
fn test_config_rejects_invalid_values() {
    let zero = run_with_env(&[("NAV_MAX_REDIRECTS", "0")], NavConfig::load);
    assert!(matches!(zero, Err(ConfigError::InvalidNumber { .. })));

    let blank = run_with_env(&[("NAV_TOKEN_KEY", "  ")], NavConfig::load);
    assert_eq!(blank, Err(ConfigError::Empty { var: "NAV_TOKEN_KEY" }));

    let relative = run_with_env(&[("NAV_LOGIN_PATH", "login")], NavConfig::load);
    assert!(matches!(relative, Err(ConfigError::RelativeLoginPath(_))));
}

#[test]
#[serial]
fn test_session_file_is_local_only() {
    let local = run_with_env(&[("NAV_SESSION_FILE", "/tmp/session.json")], NavConfig::load).unwrap();
    assert_eq!(local.session_file, Some(PathBuf::from("/tmp/session.json")));

    let production = run_with_env(
        &[("APP_ENV", "production"), ("NAV_SESSION_FILE", "/tmp/session.json")],
        NavConfig::load,
    );
    assert_eq!(production, Err(ConfigError::SessionFileInProduction));
}

fn state_with(config: NavConfig) -> Result<AppState, ConfigError> {
    let table = routes::app_table_for(&config).unwrap();
    AppState::new(table, config)
}

#[test]
fn test_app_state_requires_known_home_route() {
    let result = state_with(NavConfig {
        home_route: "Dashboard".to_string(),
        ..NavConfig::default()
    });
    assert_eq!(
        result.err(),
        Some(ConfigError::UnknownHomeRoute("Dashboard".to_string()))
    );
}

#[test]
fn test_app_state_rejects_home_route_that_cannot_settle() {
    let login = state_with(NavConfig {
        home_route: "Login".to_string(),
        ..NavConfig::default()
    });
    assert_eq!(
        login.err(),
        Some(ConfigError::HomeRouteIsAuthScreen("Login".to_string()))
    );

    let register = state_with(NavConfig {
        home_route: "Register".to_string(),
        ..NavConfig::default()
    });
    assert!(matches!(register, Err(ConfigError::HomeRouteIsAuthScreen(_))));

    let with_param = state_with(NavConfig {
        home_route: "TaskDetails".to_string(),
        ..NavConfig::default()
    });
    assert_eq!(
        with_param.err(),
        Some(ConfigError::HomeRouteNeedsParams {
            route: "TaskDetails".to_string(),
            param: "id".to_string(),
        })
    );
}

#[test]
fn test_app_state_requires_public_login_view() {
    // A gated login page would send anonymous users around in circles.
    for login_path in ["/main-page", "/chats/7", "/no-such-page"] {
        let result = state_with(NavConfig {
            login_path: login_path.to_string(),
            ..NavConfig::default()
        });
        assert_eq!(
            result.err(),
            Some(ConfigError::LoginPathNotPublicView(login_path.to_string())),
            "login path {login_path}"
        );
    }

    // `/` only redirects, it renders nothing.
    let root = state_with(NavConfig {
        login_path: "/".to_string(),
        ..NavConfig::default()
    });
    assert!(matches!(root, Err(ConfigError::LoginPathNotPublicView(_))));
}

#[test]
fn test_configured_login_path_drives_every_fallback() {
    let state = state_with(NavConfig {
        login_path: "/register".to_string(),
        home_route: "AboutUs".to_string(),
        ..NavConfig::default()
    })
    .unwrap();
    let anonymous = state.navigator(BearerToken(None));

    for path in ["/", "/no/such/page", "/profile", "/chats/3"] {
        let outcome = anonymous.navigate_path(path, None).unwrap();
        assert_eq!(outcome.path, "/register", "path {path}");
        assert_eq!(outcome.view(), Some(ViewId::Register), "path {path}");
    }

    let signed_in = state.navigator(BearerToken(Some("abc".to_string())));
    let outcome = signed_in.navigate_path("/login", None).unwrap();
    assert_eq!(outcome.view(), Some(ViewId::AboutUs));
}

#[test]
fn test_app_state_opens_session_file_only_locally() {
    let config = NavConfig {
        session_file: Some(PathBuf::from("/tmp/portal-nav-unused.json")),
        ..NavConfig::default()
    };
    let local = state_with(config.clone()).unwrap();
    assert!(local.session.is_some());

    let production = state_with(NavConfig {
        env: Env::Production,
        ..config
    })
    .unwrap();
    assert!(production.session.is_none());
}
