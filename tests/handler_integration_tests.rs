use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use portal_nav::{
    AppState, NavConfig, create_router,
    models::{Navigation, RouteSummary, ViewId},
    routes,
    storage::{KeyValueStore, MemoryStore, StorageState},
};
use std::sync::Arc;
use tower::util::ServiceExt;

fn app() -> Router {
    let state = AppState::new(routes::app_table().unwrap(), NavConfig::default()).unwrap();
    create_router(state)
}

fn app_with_session(store: StorageState) -> Router {
    let state = AppState::new(routes::app_table().unwrap(), NavConfig::default())
        .unwrap()
        .with_session(store);
    create_router(state)
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_navigate_protected_path_without_token() {
    let response = app()
        .oneshot(get("/navigate?path=/profile", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let navigation: Navigation = read_json(response).await;
    assert_eq!(navigation.path, "/login");
    assert_eq!(navigation.redirects, vec!["/profile".to_string()]);
}

#[tokio::test]
async fn test_navigate_protected_path_with_bearer_token() {
    let response = app()
        .oneshot(get("/navigate?path=/chats/42&from=/main-page", Some("abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let navigation: Navigation = read_json(response).await;
    assert_eq!(navigation.path, "/chats/42");
    assert_eq!(navigation.view(), Some(ViewId::ChatRoom));
    assert_eq!(
        navigation.views[1].props.get("id").map(String::as_str),
        Some("42")
    );
}

#[tokio::test]
async fn test_malformed_authorization_header_is_anonymous() {
    let request = Request::builder()
        .uri("/navigate?path=/main-page")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let navigation: Navigation = read_json(app().oneshot(request).await.unwrap()).await;
    assert_eq!(navigation.path, "/login");
}

#[tokio::test]
async fn test_navigate_by_name() {
    let response = app()
        .oneshot(post_json(
            "/navigate",
            Some("abc"),
            serde_json::json!({ "name": "TaskResult", "params": { "taskId": "77" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let navigation: Navigation = read_json(response).await;
    assert_eq!(navigation.path, "/task-result/77");
    assert_eq!(navigation.route_name.as_deref(), Some("TaskResult"));
}

#[tokio::test]
async fn test_navigate_by_unknown_name_is_bad_request() {
    let response = app()
        .oneshot(post_json(
            "/navigate",
            None,
            serde_json::json!({ "name": "Nowhere" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_navigate_by_name_missing_param_is_bad_request() {
    let response = app()
        .oneshot(post_json(
            "/navigate",
            Some("abc"),
            serde_json::json!({ "name": "EditTask", "params": {} }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_local_session_file_fallback() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with_session(store.clone());

    let before: Navigation = read_json(
        app.clone()
            .oneshot(get("/navigate?path=/main-page", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(before.path, "/login");

    store.set("jwtToken", "from-login-script").unwrap();
    let after: Navigation = read_json(
        app.oneshot(get("/navigate?path=/main-page", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(after.path, "/main-page");
}

#[tokio::test]
async fn test_list_routes() {
    let response = app().oneshot(get("/routes", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summaries: Vec<RouteSummary> = read_json(response).await;
    assert_eq!(summaries.first().map(|s| s.path.as_str()), Some("/login"));
    assert_eq!(summaries.last().map(|s| s.path.as_str()), Some("/*"));
    assert!(summaries.iter().any(|s| s.path == "/chats/:id" && s.requires_auth));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = app()
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc: serde_json::Value = read_json(response).await;
    assert!(doc["paths"]["/navigate"]["get"].is_object());
    assert!(doc["paths"]["/navigate"]["post"].is_object());
}
