//! Characters, voices and streaming avatars.
//!
//! The vendor listings are deserialized into the `HeyGen*` / `LiveAvatar*`
//! shapes below and reshaped into the flat items the front-end consumes.

use serde::{Deserialize, Serialize};

/// Kind of persona a rendered video is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Avatar,
    TalkingPhoto,
}

impl CharacterType {
    pub fn as_str(self) -> &'static str {
        match self {
            CharacterType::Avatar => "avatar",
            CharacterType::TalkingPhoto => "talking_photo",
        }
    }

    /// Parse the wire name, returning `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "avatar" => Some(CharacterType::Avatar),
            "talking_photo" => Some(CharacterType::TalkingPhoto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterItem {
    pub id: String,
    pub name: String,
    pub preview_image: String,
    #[serde(rename = "type")]
    pub character_type: CharacterType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceItem {
    pub id: String,
    pub name: String,
    pub preview_audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingAvatarItem {
    pub id: String,
    pub name: String,
    pub preview_image: String,
}

// ---------------------------------------------------------------------------
// Vendor listing shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct HeyGenAvatar {
    pub avatar_id: String,
    pub avatar_name: Option<String>,
    pub preview_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeyGenTalkingPhoto {
    pub talking_photo_id: String,
    pub talking_photo_name: Option<String>,
    pub preview_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeyGenAvatarListing {
    #[serde(default)]
    pub avatars: Vec<HeyGenAvatar>,
    #[serde(default)]
    pub talking_photos: Vec<HeyGenTalkingPhoto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeyGenVoice {
    pub voice_id: String,
    pub name: Option<String>,
    pub preview_audio: Option<String>,
}

/// One entry of the LiveAvatar `/v1/avatars` listing. Every field is
/// optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveAvatarEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub preview_url: Option<String>,
}

/// Name fallback for streaming avatars the vendor returns without one.
pub const UNNAMED_AVATAR: &str = "Unnamed Avatar";

fn or_fallback(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}

/// Flatten the avatar listing into characters, avatars first.
///
/// When `allowlist` is non-empty only characters whose id appears in it are
/// kept.
pub fn characters_from_listing(
    listing: HeyGenAvatarListing,
    allowlist: &[String],
) -> Vec<CharacterItem> {
    let avatars = listing.avatars.into_iter().map(|a| CharacterItem {
        name: or_fallback(a.avatar_name, &a.avatar_id),
        preview_image: a.preview_image_url.unwrap_or_default(),
        id: a.avatar_id,
        character_type: CharacterType::Avatar,
    });

    let photos = listing.talking_photos.into_iter().map(|p| CharacterItem {
        name: or_fallback(p.talking_photo_name, &p.talking_photo_id),
        preview_image: p.preview_image_url.unwrap_or_default(),
        id: p.talking_photo_id,
        character_type: CharacterType::TalkingPhoto,
    });

    avatars
        .chain(photos)
        .filter(|c| allowlist.is_empty() || allowlist.iter().any(|id| *id == c.id))
        .collect()
}

pub fn voices_from_listing(voices: Vec<HeyGenVoice>) -> Vec<VoiceItem> {
    voices
        .into_iter()
        .map(|v| VoiceItem {
            name: or_fallback(v.name, &v.voice_id),
            preview_audio: v.preview_audio.filter(|a| !a.is_empty()),
            id: v.voice_id,
        })
        .collect()
}

pub fn streaming_avatars_from_listing(entries: Vec<LiveAvatarEntry>) -> Vec<StreamingAvatarItem> {
    entries
        .into_iter()
        .map(|e| StreamingAvatarItem {
            id: e.id.unwrap_or_default(),
            name: or_fallback(e.name, UNNAMED_AVATAR),
            preview_image: e.preview_url.unwrap_or_default(),
        })
        .collect()
}
