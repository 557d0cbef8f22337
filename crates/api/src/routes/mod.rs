pub mod health;
pub mod heygen;
pub mod liveavatar;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /heygen/avatars                  list characters (GET)
/// /heygen/voices                   list voices (GET)
/// /heygen/generate                 queue a scripted video (POST)
/// /heygen/agent                    queue a prompt-driven video (POST)
/// /heygen/status?id=               render status (GET)
/// /heygen/upload                   upload an asset (POST, multipart)
///
/// /liveavatar/avatars              list streaming avatars (GET)
/// /liveavatar/session              create (POST), close (DELETE)
/// /liveavatar/start                start a session (POST)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Pre-rendered video generation.
        .nest("/heygen", heygen::router(config.upload_max_bytes))
        // Real-time streaming sessions.
        .nest("/liveavatar", liveavatar::router())
}
