//! Video generation request builder.
//!
//! Translates UI-level selections (character, voice, caption, background,
//! aspect ratio) into the nested HeyGen `/v2/video/generate` schema.
//!
//! Pure logic: [`GenerateVideoRequest::validate`] checks client input and
//! [`build_generate_body`] produces the vendor payload. The same payload
//! always yields the same body, including which optional fields are omitted.

use serde::de::{Deserializer, IntoDeserializer};
use serde::{Deserialize, Serialize};

use crate::character::CharacterType;
use crate::error::CoreError;
use crate::non_blank;

/// Line height used for captions when none (or zero) is given.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;
pub const DEFAULT_VOICE_SPEED: f64 = 1.0;
pub const DEFAULT_VOICE_PITCH: f64 = 0.0;

const AVATAR_SCALE: u32 = 1;
const AVATAR_STYLE: &str = "normal";
const VOICE_INPUT_TYPE: &str = "text";
const VOICE_DURATION: &str = "1";
const CAPTION_TYPE: &str = "text";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    /// Output dimensions in pixels as `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Landscape => (1920, 1080),
            AspectRatio::Portrait => (1080, 1920),
            AspectRatio::Square => (1080, 1080),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TalkingStyle {
    #[default]
    Stable,
    Expressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionTextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Color,
    Image,
    Video,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterSettings {
    pub expression: Option<String>,
    pub super_resolution: Option<bool>,
    pub matting: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub speed: Option<f64>,
    pub pitch: Option<f64>,
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionSettings {
    pub color: Option<String>,
    pub text_align: Option<CaptionTextAlign>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    #[serde(rename = "type")]
    pub background_type: BackgroundType,
    pub color: Option<String>,
    pub image_asset_id: Option<String>,
    pub video_asset_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Client input
// ---------------------------------------------------------------------------

/// Body of `POST /api/heygen/generate` as sent by the front-end.
///
/// Required fields are optional here so that missing values surface as
/// descriptive validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub character_id: Option<String>,
    pub character_type: Option<String>,
    pub voice_id: Option<String>,
    pub text: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub talking_style: Option<TalkingStyle>,
    pub include_captions: Option<bool>,
    pub line_height: Option<f64>,
    pub character_settings: Option<CharacterSettings>,
    pub voice_settings: Option<VoiceSettings>,
    pub caption_settings: Option<CaptionSettings>,
    pub background_settings: Option<BackgroundSettings>,
}

/// Read an optional string-valued enum, treating `""` like an absent field.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => {
            T::deserialize(IntoDeserializer::<D::Error>::into_deserializer(value)).map(Some)
        }
        _ => Ok(None),
    }
}

/// A validated generation request with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateVideoPayload {
    pub character_id: String,
    pub character_type: CharacterType,
    pub voice_id: String,
    pub text: String,
    pub aspect_ratio: AspectRatio,
    pub talking_style: TalkingStyle,
    pub include_captions: bool,
    pub line_height: Option<f64>,
    pub character_settings: CharacterSettings,
    pub voice_settings: VoiceSettings,
    pub caption_settings: CaptionSettings,
    pub background_settings: Option<BackgroundSettings>,
}

impl GenerateVideoRequest {
    /// Check required fields and apply defaults.
    pub fn validate(self) -> Result<GenerateVideoPayload, CoreError> {
        let character_id = non_blank(self.character_id.as_deref())
            .ok_or_else(|| CoreError::validation("Character is required"))?
            .to_string();

        let character_type = self
            .character_type
            .as_deref()
            .and_then(CharacterType::parse)
            .ok_or_else(|| CoreError::validation("Valid character type is required"))?;

        let voice_id = non_blank(self.voice_id.as_deref())
            .ok_or_else(|| CoreError::validation("Voice is required"))?
            .to_string();

        let text = non_blank(self.text.as_deref())
            .ok_or_else(|| CoreError::validation("Text is required"))?
            .to_string();

        Ok(GenerateVideoPayload {
            character_id,
            character_type,
            voice_id,
            text,
            aspect_ratio: self.aspect_ratio.unwrap_or_default(),
            talking_style: self.talking_style.unwrap_or_default(),
            include_captions: self.include_captions.unwrap_or(false),
            line_height: self.line_height,
            character_settings: self.character_settings.unwrap_or_default(),
            voice_settings: self.voice_settings.unwrap_or_default(),
            caption_settings: self.caption_settings.unwrap_or_default(),
            background_settings: self.background_settings,
        })
    }
}

// ---------------------------------------------------------------------------
// Vendor payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoGenerateBody {
    pub caption: bool,
    pub dimension: Dimension,
    pub video_inputs: Vec<VideoInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInput {
    pub character: CharacterInput,
    pub voice: VoiceInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<CaptionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CharacterInput {
    Avatar {
        avatar_id: String,
        scale: u32,
        avatar_style: &'static str,
        talking_style: TalkingStyle,
        #[serde(skip_serializing_if = "Option::is_none")]
        expression: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        super_resolution: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        matting: Option<bool>,
    },
    TalkingPhoto {
        talking_photo_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expression: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        super_resolution: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        matting: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceInput {
    #[serde(rename = "type")]
    pub input_type: &'static str,
    pub input_text: String,
    pub voice_id: String,
    pub speed: f64,
    pub pitch: f64,
    pub duration: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionInput {
    #[serde(rename = "type")]
    pub input_type: &'static str,
    pub text: String,
    pub line_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<CaptionTextAlign>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundInput {
    #[serde(rename = "type")]
    pub background_type: BackgroundType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_asset_id: Option<String>,
}

fn owned_non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

/// Build the `/v2/video/generate` body for a validated payload.
pub fn build_generate_body(payload: &GenerateVideoPayload) -> VideoGenerateBody {
    let (width, height) = payload.aspect_ratio.dimensions();

    VideoGenerateBody {
        caption: payload.include_captions,
        dimension: Dimension { width, height },
        video_inputs: vec![VideoInput {
            character: build_character(payload),
            voice: build_voice(payload),
            text: build_caption(payload),
            background: payload.background_settings.as_ref().map(build_background),
        }],
    }
}

fn build_character(payload: &GenerateVideoPayload) -> CharacterInput {
    let settings = &payload.character_settings;
    let expression = owned_non_empty(&settings.expression);

    match payload.character_type {
        CharacterType::Avatar => CharacterInput::Avatar {
            avatar_id: payload.character_id.clone(),
            scale: AVATAR_SCALE,
            avatar_style: AVATAR_STYLE,
            talking_style: payload.talking_style,
            expression,
            super_resolution: settings.super_resolution,
            matting: settings.matting,
        },
        CharacterType::TalkingPhoto => CharacterInput::TalkingPhoto {
            talking_photo_id: payload.character_id.clone(),
            expression,
            super_resolution: settings.super_resolution,
            matting: settings.matting,
        },
    }
}

fn build_voice(payload: &GenerateVideoPayload) -> VoiceInput {
    let settings = &payload.voice_settings;
    VoiceInput {
        input_type: VOICE_INPUT_TYPE,
        input_text: payload.text.clone(),
        voice_id: payload.voice_id.clone(),
        speed: settings.speed.unwrap_or(DEFAULT_VOICE_SPEED),
        pitch: settings.pitch.unwrap_or(DEFAULT_VOICE_PITCH),
        duration: VOICE_DURATION,
        emotion: owned_non_empty(&settings.emotion),
    }
}

fn build_caption(payload: &GenerateVideoPayload) -> Option<CaptionInput> {
    if !payload.include_captions {
        return None;
    }
    Some(CaptionInput {
        input_type: CAPTION_TYPE,
        text: payload.text.clone(),
        line_height: payload
            .line_height
            .filter(|h| *h != 0.0)
            .unwrap_or(DEFAULT_LINE_HEIGHT),
        color: owned_non_empty(&payload.caption_settings.color),
        text_align: payload.caption_settings.text_align,
    })
}

fn build_background(settings: &BackgroundSettings) -> BackgroundInput {
    let mut background = BackgroundInput {
        background_type: settings.background_type,
        color: None,
        image_asset_id: None,
        video_asset_id: None,
    };
    match settings.background_type {
        BackgroundType::Color => background.color = owned_non_empty(&settings.color),
        BackgroundType::Image => background.image_asset_id = owned_non_empty(&settings.image_asset_id),
        BackgroundType::Video => background.video_asset_id = owned_non_empty(&settings.video_asset_id),
    }
    background
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
