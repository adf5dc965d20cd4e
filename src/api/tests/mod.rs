use super::*;
use crate::media::HttpMediaFetcher;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Config with a short audio timeout so unreachable hosts fail fast
fn test_config() -> Config {
    let mut config = Config::default();
    config.media.fetch_timeout = Duration::from_secs(2);
    config
}

fn test_router_with(config: Config) -> Router {
    let fetcher = HttpMediaFetcher::new(&config.media).unwrap();
    create_router(Arc::new(config), Arc::new(fetcher))
}

fn test_router() -> Router {
    test_router_with(test_config())
}

/// POST `body` to /create-deck as JSON
async fn post_deck(app: Router, body: impl Into<String>) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri("/create-deck")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_and_shuts_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let config = Arc::new(test_config());
    let fetcher: Arc<dyn MediaFetcher> = Arc::new(HttpMediaFetcher::new(&config.media).unwrap());

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, config, fetcher, async move {
        stop_rx.await.ok();
    }));

    let response = reqwest::get(format!("http://{}/health", address))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok(), "server returned {result:?}");
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = test_router();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = test_config();
    config.api.cors_enabled = false;
    let app = test_router_with(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be absent when CORS is disabled"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = test_config();
    config.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = test_router_with(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_router();

    let request = Request::builder()
        .uri("/downloads")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
