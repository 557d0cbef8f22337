//! Handlers for the LiveAvatar streaming endpoints.

use avatarcast_core::character::{streaming_avatars_from_listing, StreamingAvatarItem};
use avatarcast_core::streaming::{
    CloseSessionRequest, CreateSessionRequest, LiveCredentials, SessionCredentials,
    StartSessionRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::caller::CallerId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StreamingAvatarsResponse {
    pub avatars: Vec<StreamingAvatarItem>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/liveavatar/avatars
pub async fn list_streaming_avatars(
    State(state): State<AppState>,
) -> AppResult<Json<StreamingAvatarsResponse>> {
    let entries = state.liveavatar.list_avatars().await?;
    Ok(Json(StreamingAvatarsResponse {
        avatars: streaming_avatars_from_listing(entries),
    }))
}

/// POST /api/liveavatar/session
///
/// Mint a session token for the caller, closing their previous session
/// first. The session is not started here; the client starts it.
pub async fn create_session(
    State(state): State<AppState>,
    caller: CallerId,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> AppResult<Json<SessionCredentials>> {
    let Json(input) = body?;
    let credentials = state
        .sessions
        .create_session(&caller, input.avatar_id.as_deref(), input.voice_id.as_deref())
        .await?;
    Ok(Json(credentials))
}

/// DELETE /api/liveavatar/session
///
/// Best-effort close. A missing or unparsable body closes the caller's
/// recorded session.
pub async fn close_session(
    State(state): State<AppState>,
    caller: CallerId,
    body: Result<Json<CloseSessionRequest>, JsonRejection>,
) -> Json<MessageResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    state
        .sessions
        .close_session(
            &caller,
            input.session_id.as_deref(),
            input.session_token.as_deref(),
        )
        .await;
    Json(MessageResponse {
        message: "Session closed successfully",
    })
}

/// POST /api/liveavatar/start
///
/// Exchange a session token for LiveKit credentials.
pub async fn start_session(
    State(state): State<AppState>,
    body: Result<Json<StartSessionRequest>, JsonRejection>,
) -> AppResult<Json<LiveCredentials>> {
    let Json(input) = body?;
    let credentials = state
        .sessions
        .start_session(input.session_token.as_deref())
        .await?;
    Ok(Json(credentials))
}
