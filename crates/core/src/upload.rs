//! Asset upload constraints.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// MIME types the vendor accepts as uploaded assets.
pub const ALLOWED_UPLOAD_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "video/mp4",
    "video/webm",
    "audio/mpeg",
];

/// Vendor envelope `code` that marks a successful upload.
pub const UPLOAD_SUCCESS_CODE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFileType {
    Image,
    Video,
    Audio,
}

/// Response of `POST /api/heygen/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub asset_id: String,
    pub url: String,
    pub file_type: AssetFileType,
    pub name: String,
}

/// Reject content types outside [`ALLOWED_UPLOAD_MIME_TYPES`].
///
/// Parameters such as `; charset=...` are ignored.
pub fn validate_mime(content_type: Option<&str>) -> Result<&'static str, CoreError> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    ALLOWED_UPLOAD_MIME_TYPES
        .iter()
        .find(|allowed| **allowed == essence)
        .copied()
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid file type. Supported types: {}",
                ALLOWED_UPLOAD_MIME_TYPES.join(", ")
            ))
        })
}
