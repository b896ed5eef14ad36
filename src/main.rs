use portal_nav::{AppState, Env, NavConfig, create_router, routes};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, compiles the route table and serves
/// the navigation API.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on invalid values)
    dotenv::dotenv().ok();
    let config = NavConfig::load().expect("FATAL: invalid navigation configuration");

    // 2. Logging, RUST_LOG first, then local-development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_nav=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Navigation service starting in {:?} mode", config.env);

    // 3. Route table. Misconfiguration here is a programming defect.
    let table = routes::app_table_for(&config).expect("FATAL: portal route table is misconfigured");
    tracing::info!(routes = table.summaries().len(), "route table compiled");

    if let Some(path) = &config.session_file {
        tracing::info!(path = %path.display(), key = %config.token_key, "using local session file");
    }

    // 4. State and server
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(table, config)
        .expect("FATAL: login path or home route does not fit the route table");
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind listener");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
