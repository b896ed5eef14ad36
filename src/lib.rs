use axum::{
    Router,
    http::HeaderName,
    routing::get,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core.
pub mod guards;
pub mod models;
pub mod navigator;
pub mod pattern;
pub mod table;

// Token access and its backing store.
pub mod auth;
pub mod storage;

// Service surface.
pub mod config;
pub mod handlers;

// The portal's route table (public and authenticated views).
pub mod routes;

use auth::{BearerToken, StaticToken, StoredToken, TokenProvider};
use config::ConfigError;
use routes::names;
use storage::{FileStore, StorageState};

// --- Public Re-exports ---

pub use config::{Env, NavConfig};
pub use guards::GuardChain;
pub use navigator::{NavigationError, Navigator};
pub use table::{RouteTable, RouteTableError};

/// ApiDoc
///
/// OpenAPI document for the navigation service, served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::navigate_by_path, handlers::navigate_by_name,
        handlers::list_routes
    ),
    components(
        schemas(
            models::Navigation, models::ActivatedView, models::NavigationTarget,
            models::NavigationDecision, models::NamedNavigationRequest, models::RouteSummary,
            models::ViewId,
        )
    ),
    tags(
        (name = "portal-nav", description = "Portal navigation resolution API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, shared by every handler: the compiled route
/// table, the loaded configuration and, in local development, the session
/// store that stands in for the browser's local storage.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub config: NavConfig,
    pub session: Option<StorageState>,
}

impl AppState {
    /// new
    ///
    /// Wires the table and configuration together. Rejects a home route or
    /// login path that would keep the guards from settling: the login path
    /// must render a view nobody needs a token for, and the home route must
    /// be a parameterless view other than the auth screens.
    pub fn new(table: RouteTable, config: NavConfig) -> Result<Self, ConfigError> {
        check_login_path(&table, &config.login_path)?;
        check_home_route(&table, &config.home_route)?;

        let session = match (&config.env, &config.session_file) {
            (Env::Local, Some(path)) => Some(Arc::new(FileStore::new(path)) as StorageState),
            _ => None,
        };

        Ok(Self {
            table: Arc::new(table),
            config,
            session,
        })
    }

    /// Replaces the session store, e.g. with an in-memory one in tests.
    pub fn with_session(mut self, session: StorageState) -> Self {
        self.session = Some(session);
        self
    }

    /// navigator
    ///
    /// Builds the navigator for one request. The bearer token wins; without
    /// one, a local environment falls back to the persisted session.
    pub fn navigator(&self, bearer: BearerToken) -> Navigator {
        let tokens: Arc<dyn TokenProvider> = match (bearer.0, &self.session) {
            (Some(token), _) => Arc::new(StaticToken::present(token)),
            (None, Some(store)) if self.config.env == Env::Local => {
                Arc::new(StoredToken::new(store.clone(), self.config.token_key.clone()))
            }
            (None, _) => Arc::new(StaticToken::absent()),
        };

        Navigator::new(
            self.table.clone(),
            GuardChain::portal(tokens, &self.config),
            self.config.max_redirects,
        )
    }
}

fn check_login_path(table: &RouteTable, login_path: &str) -> Result<(), ConfigError> {
    let public_view = table.resolve(login_path).is_some_and(|matched| {
        matched.leaf().view().is_some()
            && !matched.chain.iter().any(|record| record.requires_auth())
    });
    if !public_view {
        return Err(ConfigError::LoginPathNotPublicView(login_path.to_string()));
    }
    Ok(())
}

fn check_home_route(table: &RouteTable, home_route: &str) -> Result<(), ConfigError> {
    let record = table
        .find_by_name(home_route)
        .ok_or_else(|| ConfigError::UnknownHomeRoute(home_route.to_string()))?;

    if home_route == names::LOGIN || home_route == names::REGISTER {
        return Err(ConfigError::HomeRouteIsAuthScreen(home_route.to_string()));
    }
    if record.view().is_none() {
        return Err(ConfigError::HomeRouteNotAView(home_route.to_string()));
    }
    if let Some(param) = record.pattern().param_names().next() {
        return Err(ConfigError::HomeRouteNeedsParams {
            route: home_route.to_string(),
            param: param.to_string(),
        });
    }
    Ok(())
}

/// create_router
///
/// Assembles the HTTP surface, applies the observability layers and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .route("/routes", get(handlers::list_routes))
        .route(
            "/navigate",
            get(handlers::navigate_by_path).post(handlers::navigate_by_name),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, tagged with the `x-request-id` assigned above so
/// every navigation log line can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
