//! Route definitions for LiveAvatar streaming sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::liveavatar;
use crate::state::AppState;

/// Routes mounted at `/api/liveavatar`.
///
/// ```text
/// GET    /avatars     -> list_streaming_avatars
/// POST   /session     -> create_session
/// DELETE /session     -> close_session
/// POST   /start       -> start_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/avatars", get(liveavatar::list_streaming_avatars))
        .route(
            "/session",
            post(liveavatar::create_session).delete(liveavatar::close_session),
        )
        .route("/start", post(liveavatar::start_session))
}
