use super::names;
use crate::models::{RouteDefinition, ViewId};

/// Public Routes
///
/// Views that never ask for a token. `Login` and `Register` are also the
/// targets of the authenticated-redirect guard, which bounces a session that
/// already holds a token over to the main page.
///
/// None of these carry `requires_auth`, which is what guarantees that a
/// redirect to `/login` always settles.
pub fn public_routes() -> Vec<RouteDefinition> {
    vec![
        // GET /login
        RouteDefinition::view("/login", ViewId::Login).named(names::LOGIN),
        // GET /register
        RouteDefinition::view("/register", ViewId::Register).named(names::REGISTER),
        // GET /about-us
        RouteDefinition::view("/about-us", ViewId::AboutUs).named("AboutUs"),
    ]
}
