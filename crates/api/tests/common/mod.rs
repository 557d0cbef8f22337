#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::time::Instant;
use tower::ServiceExt;

use avatarcast_api::config::ServerConfig;
use avatarcast_api::router::build_app_router;
use avatarcast_api::sessions::SessionSettings;
use avatarcast_api::state::AppState;
use avatarcast_vendor::{HeyGenConfig, LiveAvatarConfig};

pub const TEST_ORIGIN: &str = "http://localhost:3000";
pub const HEYGEN_KEY: &str = "test-heygen-key";
pub const LIVEAVATAR_KEY: &str = "test-liveavatar-key";

// ---------------------------------------------------------------------------
// Mock vendor
// ---------------------------------------------------------------------------

/// A request received by the mock vendor.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub at: Instant,
}

impl RecordedCall {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct MockInner {
    responses: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Stand-in for both vendors on one local port.
///
/// The HeyGen and LiveAvatar paths do not overlap, so a single server
/// answers for both. Unmocked paths return 404.
#[derive(Clone)]
pub struct MockVendor {
    pub url: String,
    inner: Arc<MockInner>,
}

impl MockVendor {
    pub async fn start() -> Self {
        let inner = Arc::new(MockInner::default());
        let app = Router::new()
            .fallback(record_and_respond)
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            inner,
        }
    }

    /// Start with successful responses for every vendor route.
    pub async fn with_defaults() -> Self {
        let mock = Self::start().await;
        mock.respond(
            Method::GET,
            "/v2/avatars",
            StatusCode::OK,
            json!({ "data": {
                "avatars": [{ "avatar_id": "av-1", "avatar_name": "Alex", "preview_image_url": "https://img/av-1.png" }],
                "talking_photos": [{ "talking_photo_id": "tp-1", "talking_photo_name": "Mio", "preview_image_url": "https://img/tp-1.png" }]
            }}),
        );
        mock.respond(
            Method::GET,
            "/v2/voices",
            StatusCode::OK,
            json!({ "data": { "voices": [
                { "voice_id": "v-1", "name": "Aoi", "preview_audio": "https://audio/v-1.mp3" },
                { "voice_id": "v-2", "name": "", "preview_audio": "" }
            ]}}),
        );
        mock.respond(
            Method::POST,
            "/v2/video/generate",
            StatusCode::OK,
            json!({ "error": null, "data": { "video_id": "vid-123" } }),
        );
        mock.respond(
            Method::POST,
            "/v1/video_agent/generate",
            StatusCode::OK,
            json!({ "data": { "video_id": "agent-456" } }),
        );
        mock.respond(
            Method::GET,
            "/v1/video_status.get",
            StatusCode::OK,
            json!({ "data": { "status": "processing" } }),
        );
        mock.respond(
            Method::POST,
            "/v1/asset",
            StatusCode::OK,
            json!({ "code": 100, "data": {
                "id": "asset-1", "name": "photo.png", "file_type": "image", "url": "https://files/asset-1.png"
            }}),
        );
        mock.respond(
            Method::GET,
            "/v1/avatars",
            StatusCode::OK,
            json!({ "data": { "results": [
                { "id": "live-1", "name": "Kai", "preview_url": "https://img/live-1.png" },
                { "id": "live-2" }
            ]}}),
        );
        mock.respond(
            Method::POST,
            "/v1/sessions/token",
            StatusCode::OK,
            json!({ "data": { "session_id": "sess-1", "session_token": "tok-1" } }),
        );
        mock.respond(
            Method::POST,
            "/v1/sessions/start",
            StatusCode::OK,
            json!({ "data": { "livekit_url": "wss://live.example", "livekit_token": "lk-1" } }),
        );
        mock.respond(
            Method::POST,
            "/v1/streaming.stop",
            StatusCode::OK,
            json!({ "code": 100 }),
        );
        mock
    }

    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

async fn record_and_respond(
    State(inner): State<Arc<MockInner>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    inner.calls.lock().unwrap().push(RecordedCall {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body,
        at: Instant::now(),
    });

    let canned = inner.responses.lock().unwrap().get(&(method, path)).cloned();
    match canned {
        Some((status, body)) => (status, axum::Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, axum::Json(json!({ "message": "not mocked" })))
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` pointing both vendors at `vendor_url`.
///
/// Settle delays are zero so session tests run without sleeping.
pub fn test_config(vendor_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![TEST_ORIGIN.to_string()],
        request_timeout_secs: 30,
        vendor_timeout_secs: 5,
        upload_max_bytes: 1024 * 1024,
        character_allowlist: Vec::new(),
        heygen: HeyGenConfig {
            base_url: vendor_url.to_string(),
            upload_url: vendor_url.to_string(),
            api_key: HEYGEN_KEY.to_string(),
        },
        liveavatar: LiveAvatarConfig {
            base_url: vendor_url.to_string(),
            api_key: LIVEAVATAR_KEY.to_string(),
        },
        sessions: SessionSettings {
            default_voice_id: "default-voice".to_string(),
            language: "ja".to_string(),
            stop_settle: Duration::ZERO,
            replace_settle: Duration::ZERO,
        },
    }
}

/// Build the full application router through the same builder `main.rs` uses.
pub fn build_test_app(config: ServerConfig) -> Router {
    let state = AppState::from_config(config.clone()).unwrap();
    build_app_router(state, &config)
}

/// Build the app and keep its state so tests can inspect the session registry.
pub fn build_test_app_with_state(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::from_config(config.clone()).unwrap();
    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_as(app: Router, uri: &str, client_id: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-client-id", client_id)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_json_as(app: Router, uri: &str, client_id: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-client-id", client_id)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Build a `multipart/form-data` request with one file field.
pub fn multipart_request(
    uri: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "avatarcast-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
