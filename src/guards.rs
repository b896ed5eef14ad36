use std::sync::Arc;

use crate::{
    auth::TokenProvider,
    config::NavConfig,
    models::{NavigationDecision, NavigationIntent, NavigationTarget},
    routes::names,
};

/// NavigationGuard
///
/// A check run before a navigation settles. Guards are pure: the token is
/// read once by the [`GuardChain`] and handed in, so every guard can be
/// exercised on its own.
pub trait NavigationGuard: Send + Sync {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    fn check(
        &self,
        intent: &NavigationIntent<'_>,
        from: Option<&str>,
        token: Option<&str>,
    ) -> NavigationDecision;
}

/// AuthenticatedRedirect
///
/// Keeps a session that already holds a token away from the auth screens:
/// opening `Login` or `Register` with a token sends it to the home route.
#[derive(Debug, Clone)]
pub struct AuthenticatedRedirect {
    auth_routes: Vec<String>,
    home: NavigationTarget,
}

impl AuthenticatedRedirect {
    pub fn new(auth_routes: Vec<String>, home: NavigationTarget) -> Self {
        Self { auth_routes, home }
    }
}

impl Default for AuthenticatedRedirect {
    fn default() -> Self {
        Self::new(
            vec![names::LOGIN.to_string(), names::REGISTER.to_string()],
            NavigationTarget::named(names::MAIN_PAGE),
        )
    }
}

impl NavigationGuard for AuthenticatedRedirect {
    fn label(&self) -> &'static str {
        "authenticated-redirect"
    }

    fn check(
        &self,
        intent: &NavigationIntent<'_>,
        _from: Option<&str>,
        token: Option<&str>,
    ) -> NavigationDecision {
        let on_auth_screen = intent
            .route_name()
            .is_some_and(|name| self.auth_routes.iter().any(|r| r == name));

        if token.is_some() && on_auth_screen {
            NavigationDecision::redirect(self.home.clone())
        } else {
            NavigationDecision::Allow
        }
    }
}

/// AuthRequired
///
/// Sends an unauthenticated navigation to the login page when the matched
/// record, or any of its ancestors, is flagged `requires_auth`.
#[derive(Debug, Clone)]
pub struct AuthRequired {
    login: NavigationTarget,
}

impl AuthRequired {
    pub fn new(login: NavigationTarget) -> Self {
        Self { login }
    }
}

impl Default for AuthRequired {
    fn default() -> Self {
        Self::new(NavigationTarget::path(crate::routes::LOGIN_PATH))
    }
}

impl NavigationGuard for AuthRequired {
    fn label(&self) -> &'static str {
        "auth-required"
    }

    fn check(
        &self,
        intent: &NavigationIntent<'_>,
        _from: Option<&str>,
        token: Option<&str>,
    ) -> NavigationDecision {
        if token.is_none() && intent.requires_auth() {
            NavigationDecision::redirect(self.login.clone())
        } else {
            NavigationDecision::Allow
        }
    }
}

/// GuardChain
///
/// Ordered guards plus the token source they consult. The first guard that
/// redirects ends the evaluation; the rest do not run for that attempt.
#[derive(Clone)]
pub struct GuardChain {
    tokens: Arc<dyn TokenProvider>,
    guards: Vec<Arc<dyn NavigationGuard>>,
}

impl GuardChain {
    /// An empty chain: every navigation is allowed.
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            guards: Vec::new(),
        }
    }

    /// Appends a guard; guards run in the order they are added.
    pub fn with_guard(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// portal
    ///
    /// The portal's two guards, already-authenticated redirect first.
    pub fn portal(tokens: Arc<dyn TokenProvider>, config: &NavConfig) -> Self {
        Self::new(tokens)
            .with_guard(AuthenticatedRedirect::new(
                vec![names::LOGIN.to_string(), names::REGISTER.to_string()],
                NavigationTarget::named(config.home_route.clone()),
            ))
            .with_guard(AuthRequired::new(NavigationTarget::path(
                config.login_path.clone(),
            )))
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// evaluate
    ///
    /// Reads the token once, then runs the guards in registration order.
    pub fn evaluate(&self, intent: &NavigationIntent<'_>, from: Option<&str>) -> NavigationDecision {
        let token = self.tokens.current_token();

        for guard in &self.guards {
            let decision = guard.check(intent, from, token.as_deref());
            if let NavigationDecision::RedirectTo { target } = &decision {
                tracing::info!(
                    guard = guard.label(),
                    path = %intent.target_path,
                    ?target,
                    "navigation redirected"
                );
                return decision;
            }
        }

        tracing::debug!(path = %intent.target_path, authenticated = token.is_some(), "navigation allowed");
        NavigationDecision::Allow
    }
}
