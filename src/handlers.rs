use crate::{
    AppState,
    auth::BearerToken,
    models::{NamedNavigationRequest, Navigation, NavigationTarget, RouteSummary},
    navigator::NavigationError,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

// --- Query Structs ---

/// NavigateQuery
///
/// Query parameters of `GET /navigate`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NavigateQuery {
    /// Path the SPA wants to open, query string included if any.
    pub path: String,
    /// Path the user is currently on.
    pub from: Option<String>,
}

// --- Handlers ---

/// health
///
/// Liveness probe for load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// navigate_by_path
///
/// Resolves a path the way the in-browser router would for the caller's token.
/// Unknown paths are not an error: they settle on the login page through the
/// catch-all.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Settled navigation", body = Navigation),
        (status = 508, description = "Redirect loop")
    )
)]
pub async fn navigate_by_path(
    token: BearerToken,
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<Navigation>, StatusCode> {
    state
        .navigator(token)
        .navigate(NavigationTarget::path(query.path), query.from.as_deref())
        .map(Json)
        .map_err(|e| navigation_status(&e))
}

/// navigate_by_name
///
/// Programmatic navigation by route name plus params.
#[utoipa::path(
    post,
    path = "/navigate",
    request_body = NamedNavigationRequest,
    responses(
        (status = 200, description = "Settled navigation", body = Navigation),
        (status = 400, description = "Unknown route name or missing param"),
        (status = 508, description = "Redirect loop")
    )
)]
pub async fn navigate_by_name(
    token: BearerToken,
    State(state): State<AppState>,
    Json(payload): Json<NamedNavigationRequest>,
) -> Result<Json<Navigation>, StatusCode> {
    let target = NavigationTarget::named_with(payload.name, payload.params);
    state
        .navigator(token)
        .navigate(target, payload.from.as_deref())
        .map(Json)
        .map_err(|e| navigation_status(&e))
}

/// list_routes
///
/// The route surface, flattened. `requires_auth` accounts for parents.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "All route records", body = [RouteSummary]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    Json(state.table.summaries())
}

/// navigation_status
///
/// Maps a failed navigation onto an HTTP status.
pub fn navigation_status(error: &NavigationError) -> StatusCode {
    tracing::warn!(%error, "navigation failed");
    match error {
        NavigationError::UnknownRouteName(_) | NavigationError::MissingParam { .. } => {
            StatusCode::BAD_REQUEST
        }
        NavigationError::RedirectLoop { .. } => StatusCode::LOOP_DETECTED,
        NavigationError::Unmatched(_) => StatusCode::NOT_FOUND,
    }
}
