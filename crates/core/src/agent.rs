//! Prompt-driven "video agent" generation.
//!
//! The vendor writes the script itself from a free-form prompt; we only pass
//! the avatar and a few framing options.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::non_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Body of `POST /api/heygen/agent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentVideoRequest {
    pub avatar_id: Option<String>,
    pub prompt: Option<String>,
    pub voice_id: Option<String>,
    pub duration_sec: Option<u32>,
    pub orientation: Option<Orientation>,
}

/// Vendor body for `/v1/video_agent/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentGenerateBody {
    pub prompt: String,
    pub config: AgentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentConfig {
    pub avatar_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl AgentVideoRequest {
    /// Validate the request and build the vendor body.
    ///
    /// A zero duration is treated as unset.
    pub fn into_body(self) -> Result<AgentGenerateBody, CoreError> {
        let avatar_id = non_blank(self.avatar_id.as_deref())
            .ok_or_else(|| CoreError::validation("Avatar is required"))?
            .to_string();
        let prompt = non_blank(self.prompt.as_deref())
            .ok_or_else(|| CoreError::validation("Prompt is required"))?
            .to_string();

        Ok(AgentGenerateBody {
            prompt,
            config: AgentConfig {
                avatar_id,
                voice_id: non_blank(self.voice_id.as_deref()).map(str::to_string),
                duration_sec: self.duration_sec.filter(|d| *d > 0),
                orientation: self.orientation,
            },
        })
    }
}
