//! Route definitions for the HeyGen proxy.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::heygen;
use crate::state::AppState;

/// Routes mounted at `/api/heygen`.
///
/// ```text
/// GET  /avatars       -> list_characters
/// GET  /voices        -> list_voices
/// POST /generate      -> generate_video
/// POST /agent         -> generate_agent_video
/// GET  /status        -> video_status
/// POST /upload        -> upload_asset
/// ```
///
/// Only the upload route lifts the default body limit.
pub fn router(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/avatars", get(heygen::list_characters))
        .route("/voices", get(heygen::list_voices))
        .route("/generate", post(heygen::generate_video))
        .route("/agent", post(heygen::generate_agent_video))
        .route("/status", get(heygen::video_status))
        .route(
            "/upload",
            post(heygen::upload_asset).layer(DefaultBodyLimit::max(upload_max_bytes)),
        )
}
