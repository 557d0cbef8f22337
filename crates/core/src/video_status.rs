//! Rendered-video job status.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Waiting,
    #[default]
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    /// Parse a vendor status string. Missing or unknown values read as
    /// [`VideoStatus::Processing`] so pollers keep going.
    pub fn from_vendor(s: Option<&str>) -> Self {
        match s {
            Some("pending") => VideoStatus::Pending,
            Some("waiting") => VideoStatus::Waiting,
            Some("processing") => VideoStatus::Processing,
            Some("completed") => VideoStatus::Completed,
            Some("failed") => VideoStatus::Failed,
            _ => VideoStatus::Processing,
        }
    }

    /// `completed` and `failed` end a job; nothing changes after them.
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

/// Status as returned by `GET /api/heygen/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStatusResponse {
    pub status: VideoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `data` object of the vendor's `/v1/video_status.get` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorVideoStatus {
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// A string or an object `{ code, message, detail }` depending on the
    /// failure.
    pub error: Option<serde_json::Value>,
}

impl From<VendorVideoStatus> for VideoStatusResponse {
    fn from(v: VendorVideoStatus) -> Self {
        Self {
            status: VideoStatus::from_vendor(v.status.as_deref()),
            video_url: v.video_url,
            thumbnail_url: v.thumbnail_url,
            error: v.error.as_ref().and_then(error_text),
        }
    }
}

fn error_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("detail"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_status_reads_as_processing() {
        assert_eq!(VideoStatus::from_vendor(None), VideoStatus::Processing);
        assert_eq!(
            VideoStatus::from_vendor(Some("rendering")),
            VideoStatus::Processing
        );
        assert_eq!(
            VideoStatus::from_vendor(Some("completed")),
            VideoStatus::Completed
        );
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(VideoStatus::Completed.is_terminal());
        assert!(VideoStatus::Failed.is_terminal());
        assert!(!VideoStatus::Pending.is_terminal());
        assert!(!VideoStatus::Waiting.is_terminal());
        assert!(!VideoStatus::Processing.is_terminal());
    }

    #[test]
    fn vendor_error_object_is_flattened_to_message() {
        let vendor: VendorVideoStatus = serde_json::from_value(json!({
            "status": "failed",
            "error": { "code": 40119, "message": "Avatar not found" }
        }))
        .unwrap();
        let status = VideoStatusResponse::from(vendor);
        assert_eq!(status.status, VideoStatus::Failed);
        assert_eq!(status.error.as_deref(), Some("Avatar not found"));
    }

    #[test]
    fn completed_status_serializes_urls() {
        let status = VideoStatusResponse {
            status: VideoStatus::Completed,
            video_url: Some("https://cdn/v.mp4".into()),
            thumbnail_url: None,
            error: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, json!({ "status": "completed", "video_url": "https://cdn/v.mp4" }));
    }
}
