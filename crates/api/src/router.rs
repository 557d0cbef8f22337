//! Shared application router builder.
//!
//! Both the binary and the integration tests call [`build_app_router`], so
//! they run behind the same middleware stack.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::middleware::caller::CLIENT_ID_HEADER;
use crate::routes;
use crate::state::AppState;

/// Build the proxy [`Router`]: `/health` plus the `/api` vendor routes.
///
/// Layers, outermost first:
///
/// 1. CORS. Browser preflights for the session routes are answered here and
///    never reach a handler or a vendor.
/// 2. Request id, assigned before tracing so every span carries it.
/// 3. Tracing.
/// 4. Request id echoed on the response, so a front-end error report can be
///    matched to the proxy log line.
/// 5. Timeout. Session replacement sleeps for its settle delays and then
///    calls the vendor, so `request_timeout_secs` must exceed both settle
///    delays plus the vendor timeout.
/// 6. Panic recovery, innermost, so a panicking handler still gets a 500
///    with CORS headers and a request id.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes(config))
        // Innermost first.
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// CORS for the browser front-end.
///
/// Session calls send `x-client-id`, so it has to be an allowed header;
/// close is a `DELETE` with a JSON body, so that method is allowed too.
/// Panics at startup if any configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(CLIENT_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
