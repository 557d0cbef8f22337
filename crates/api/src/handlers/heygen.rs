//! Handlers for the HeyGen proxy endpoints.
//!
//! Each handler validates client input, forwards one call to HeyGen with the
//! server-held API key, and reshapes the vendor response.

use avatarcast_core::agent::AgentVideoRequest;
use avatarcast_core::character::{
    characters_from_listing, voices_from_listing, CharacterItem, VoiceItem,
};
use avatarcast_core::error::CoreError;
use avatarcast_core::generation::{build_generate_body, GenerateVideoRequest};
use avatarcast_core::upload::{validate_mime, UploadedAsset};
use avatarcast_core::video_status::VideoStatusResponse;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CharactersResponse {
    pub characters: Vec<CharacterItem>,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceItem>,
}

#[derive(Debug, Serialize)]
pub struct VideoIdResponse {
    pub video_id: String,
}

/// Query parameters for the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/heygen/avatars
pub async fn list_characters(State(state): State<AppState>) -> AppResult<Json<CharactersResponse>> {
    let listing = state.heygen.list_avatars().await?;
    let characters = characters_from_listing(listing, &state.config.character_allowlist);
    tracing::debug!(count = characters.len(), "Fetched characters");
    Ok(Json(CharactersResponse { characters }))
}

/// GET /api/heygen/voices
pub async fn list_voices(State(state): State<AppState>) -> AppResult<Json<VoicesResponse>> {
    let voices = voices_from_listing(state.heygen.list_voices().await?);
    tracing::debug!(count = voices.len(), "Fetched voices");
    Ok(Json(VoicesResponse { voices }))
}

/// POST /api/heygen/generate
///
/// Validates the selections, builds the vendor payload and queues the render.
pub async fn generate_video(
    State(state): State<AppState>,
    body: Result<Json<GenerateVideoRequest>, JsonRejection>,
) -> AppResult<Json<VideoIdResponse>> {
    let Json(input) = body?;
    let payload = input.validate()?;
    let video_id = state
        .heygen
        .generate_video(&build_generate_body(&payload))
        .await?;
    Ok(Json(VideoIdResponse { video_id }))
}

/// POST /api/heygen/agent
///
/// Queue a prompt-driven video.
pub async fn generate_agent_video(
    State(state): State<AppState>,
    body: Result<Json<AgentVideoRequest>, JsonRejection>,
) -> AppResult<Json<VideoIdResponse>> {
    let Json(input) = body?;
    let vendor_body = input.into_body()?;
    let video_id = state.heygen.generate_agent_video(&vendor_body).await?;
    Ok(Json(VideoIdResponse { video_id }))
}

/// GET /api/heygen/status?id={video_id}
pub async fn video_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<VideoStatusResponse>> {
    let video_id = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CoreError::validation("Video ID is required"))?;

    let status = state.heygen.video_status(video_id).await?;
    tracing::debug!(video_id, status = ?status.status, "Fetched video status");
    Ok(Json(status))
}

/// POST /api/heygen/upload
///
/// Accept a single multipart `file`, check its MIME type against the
/// whitelist, and forward the raw bytes to the vendor's asset store.
pub async fn upload_asset(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadedAsset>> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = validate_mime(field.content_type())?;
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await?;

        tracing::info!(
            file_name = %file_name,
            content_type,
            size = data.len(),
            "Uploading asset",
        );

        let asset = state.heygen.upload_asset(data, content_type).await?;
        return Ok(Json(asset));
    }

    Err(CoreError::validation("File is required").into())
}
