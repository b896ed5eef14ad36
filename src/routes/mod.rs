//! Portal Route Table
//!
//! The portal's routes are split the same way access is: views anyone may
//! open, and views gated behind a token. `app_routes` stitches both halves
//! together and closes the list with the `/` redirect and the catch-all, which
//! must stay last.

use crate::{
    config::NavConfig,
    models::{NavigationTarget, RouteDefinition},
    table::{RouteTable, RouteTableError},
};

/// Views reachable without a token.
pub mod public;

/// Views that redirect to the login page when no token is present.
pub mod authenticated;

/// Route names referenced outside the table itself (guards, config defaults).
pub mod names {
    pub const LOGIN: &str = "Login";
    pub const REGISTER: &str = "Register";
    pub const MAIN_PAGE: &str = "MainPage";
}

/// Default target of both fallback entries and of the auth-required guard.
pub const LOGIN_PATH: &str = "/login";

/// app_routes
///
/// Declaration order matters: the first structural match wins, so the
/// catch-all goes last.
pub fn app_routes() -> Vec<RouteDefinition> {
    app_routes_with_login(LOGIN_PATH)
}

/// Same table, with `/` and the catch-all sending the user to `login_path`.
pub fn app_routes_with_login(login_path: &str) -> Vec<RouteDefinition> {
    let mut routes = public::public_routes();
    routes.extend(authenticated::authenticated_routes());
    routes.push(RouteDefinition::redirect("/", NavigationTarget::path(login_path)));
    routes.push(RouteDefinition::redirect("/*", NavigationTarget::path(login_path)));
    routes
}

/// Compiled portal table.
pub fn app_table() -> Result<RouteTable, RouteTableError> {
    RouteTable::new(app_routes())
}

/// Compiled portal table whose fallbacks follow `config.login_path`.
pub fn app_table_for(config: &NavConfig) -> Result<RouteTable, RouteTableError> {
    RouteTable::new(app_routes_with_login(&config.login_path))
}
