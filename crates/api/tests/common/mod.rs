use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{COOKIE, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gazelab_api::config::ServerConfig;
use gazelab_api::session::SessionManager;
use gazelab_api::state::AppState;
use gazelab_api::{middleware, routes};
use gazelab_store::{AnnotationStore, ImagePool};

/// A fully wired test application over a temp directory fixture.
///
/// The fixture contains a two-image pool (one GazeFollow record at
/// 200x100, one VAT record at 200x100 with an out-of-frame gaze) and an
/// empty annotation store.
pub struct TestEnv {
    /// Keeps the fixture directory alive for the test's duration.
    #[allow(dead_code)]
    pub dir: TempDir,
    pub app: Router,
    #[allow(dead_code)]
    pub store_path: PathBuf,
}

/// Build a test `ServerConfig` pointing into the fixture directory.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        images_per_session: 500,
        pool_index_path: dir.path().join("pool.json"),
        merged_root: dir.path().join("merged_images"),
        annotations_path: dir.path().join("annotations.json"),
    }
}

/// Build the full application router with all middleware layers over a
/// fresh fixture.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (session cookie, CORS,
/// request ID, timeout, tracing, panic recovery) that production uses.
pub fn build_test_env() -> TestEnv {
    let dir = TempDir::new().unwrap();

    let merged = dir.path().join("merged_images");
    std::fs::create_dir_all(merged.join("gazefollow/train/00000004")).unwrap();
    std::fs::create_dir_all(merged.join("vat")).unwrap();
    image::RgbImage::new(200, 100)
        .save(merged.join("gazefollow/train/00000004/1.jpg"))
        .unwrap();
    image::RgbImage::new(200, 100)
        .save(merged.join("vat/clip_0042.jpg"))
        .unwrap();

    let pool_index = serde_json::json!([
        {
            "path": "train/00000004/1.jpg",
            "bbox": [0.1, 0.2, 0.3, 0.4],
            "eye": [0.45, 0.5],
            "gaze": [0.6, 0.7],
            "type": "image"
        },
        {
            "path": "clip_0042.jpg",
            "bbox": [20.0, 10.0, 100.0, 50.0],
            "eye": [70.0, 35.0],
            "gaze": [-1.0, -1.0],
            "type": "image"
        }
    ]);
    std::fs::write(dir.path().join("pool.json"), pool_index.to_string()).unwrap();

    let config = test_config(&dir);
    let store_path = config.annotations_path.clone();

    let pool = Arc::new(ImagePool::load(&config.pool_index_path, &config.merged_root).unwrap());
    let store = Arc::new(AnnotationStore::open(&config.annotations_path).unwrap());
    let sessions = Arc::new(SessionManager::new(
        Arc::clone(&pool),
        config.images_per_session,
    ));

    let state = AppState {
        config: Arc::new(config),
        pool,
        store,
        sessions,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true);

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::images::router())
        .nest("/api/v1", routes::api_routes())
        .layer(axum::middleware::from_fn(
            middleware::session::ensure_session,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    TestEnv {
        dir,
        app,
        store_path,
    }
}

/// GET a path without a session cookie.
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// GET a path as an established session.
#[allow(dead_code)]
pub async fn get_as(app: &Router, uri: &str, session: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(COOKIE, format!("annotator_id={session}"))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a JSON body as an established session.
#[allow(dead_code)]
pub async fn post_json_as(
    app: &Router,
    uri: &str,
    session: &str,
    body: &serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, format!("annotator_id={session}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the issued `annotator_id` cookie value, if any.
#[allow(dead_code)]
pub fn issued_session(response: &Response<Body>) -> Option<String> {
    let cookie = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let pair = cookie.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    (name == "annotator_id").then(|| value.to_string())
}
