//! Typed HTTP client for the proxy's `/api` routes.

use avatarcast_core::agent::AgentVideoRequest;
use avatarcast_core::character::{CharacterItem, StreamingAvatarItem, VoiceItem};
use avatarcast_core::generation::GenerateVideoRequest;
use avatarcast_core::streaming::{
    CloseSessionRequest, CreateSessionRequest, LiveCredentials, SessionCredentials,
    StartSessionRequest,
};
use avatarcast_core::upload::UploadedAsset;
use avatarcast_core::video_status::VideoStatusResponse;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;

/// Header identifying this client's slot in the proxy's session registry.
const CLIENT_ID_HEADER: &str = "x-client-id";

/// Client for one proxy deployment.
///
/// Each instance carries its own caller id, so two clients against the same
/// proxy hold independent streaming sessions.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
}

#[derive(Deserialize)]
struct CharactersBody {
    characters: Vec<CharacterItem>,
}

#[derive(Deserialize)]
struct VoicesBody {
    voices: Vec<VoiceItem>,
}

#[derive(Deserialize)]
struct AvatarsBody {
    avatars: Vec<StreamingAvatarItem>,
}

#[derive(Deserialize)]
struct VideoIdBody {
    video_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ProxyClient {
    /// Create a client with a fresh random caller id.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            base_url,
            uuid::Uuid::new_v4().to_string(),
        )
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    // -----------------------------------------------------------------------
    // Rendered videos
    // -----------------------------------------------------------------------

    pub async fn list_characters(&self) -> Result<Vec<CharacterItem>, ClientError> {
        let response = self.client.get(self.url("/heygen/avatars")).send().await?;
        let body: CharactersBody = parse_response(response).await?;
        Ok(body.characters)
    }

    pub async fn list_voices(&self) -> Result<Vec<VoiceItem>, ClientError> {
        let response = self.client.get(self.url("/heygen/voices")).send().await?;
        let body: VoicesBody = parse_response(response).await?;
        Ok(body.voices)
    }

    /// Queue a scripted video. Returns the video id to poll.
    pub async fn generate_video(&self, request: &GenerateVideoRequest) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/heygen/generate"))
            .json(request)
            .send()
            .await?;
        let body: VideoIdBody = parse_response(response).await?;
        Ok(body.video_id)
    }

    /// Queue a prompt-driven video. Returns the video id to poll.
    pub async fn generate_agent_video(
        &self,
        request: &AgentVideoRequest,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.url("/heygen/agent"))
            .json(request)
            .send()
            .await?;
        let body: VideoIdBody = parse_response(response).await?;
        Ok(body.video_id)
    }

    pub async fn video_status(&self, video_id: &str) -> Result<VideoStatusResponse, ClientError> {
        let response = self
            .client
            .get(self.url("/heygen/status"))
            .query(&[("id", video_id)])
            .send()
            .await?;
        parse_response(response).await
    }

    /// Upload an image, video or audio asset as the multipart field `file`.
    pub async fn upload_asset(
        &self,
        data: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadedAsset, ClientError> {
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let response = self
            .client
            .post(self.url("/heygen/upload"))
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        parse_response(response).await
    }

    // -----------------------------------------------------------------------
    // Streaming sessions
    // -----------------------------------------------------------------------

    pub async fn list_streaming_avatars(&self) -> Result<Vec<StreamingAvatarItem>, ClientError> {
        let response = self
            .client
            .get(self.url("/liveavatar/avatars"))
            .send()
            .await?;
        let body: AvatarsBody = parse_response(response).await?;
        Ok(body.avatars)
    }

    pub async fn create_session(
        &self,
        avatar_id: &str,
        voice_id: Option<&str>,
    ) -> Result<SessionCredentials, ClientError> {
        let request = CreateSessionRequest {
            avatar_id: Some(avatar_id.to_string()),
            voice_id: voice_id.map(str::to_string),
        };
        let response = self
            .client
            .post(self.url("/liveavatar/session"))
            .header(CLIENT_ID_HEADER, &self.client_id)
            .json(&request)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn start_session(&self, session_token: &str) -> Result<LiveCredentials, ClientError> {
        let request = StartSessionRequest {
            session_token: Some(session_token.to_string()),
        };
        let response = self
            .client
            .post(self.url("/liveavatar/start"))
            .header(CLIENT_ID_HEADER, &self.client_id)
            .json(&request)
            .send()
            .await?;
        parse_response(response).await
    }

    /// Close `credentials`, or this client's recorded session when `None`.
    pub async fn close_session(
        &self,
        credentials: Option<&SessionCredentials>,
    ) -> Result<(), ClientError> {
        let request = CloseSessionRequest {
            session_id: credentials.map(|c| c.session_id.clone()),
            session_token: credentials.map(|c| c.session_token.clone()),
        };
        let response = self
            .client
            .delete(self.url("/liveavatar/session"))
            .header(CLIENT_ID_HEADER, &self.client_id)
            .json(&request)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx proxy response into a [`ClientError`].
///
/// A JSON `{error}` body becomes [`ClientError::Api`]. A 408 or 5xx with any
/// other body (an empty timeout reply, a gateway HTML page) becomes
/// [`ClientError::Unavailable`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error);

    let message = match message {
        Some(message) => message,
        None if status.is_server_error() || status == reqwest::StatusCode::REQUEST_TIMEOUT => {
            tracing::debug!(status = status.as_u16(), "Proxy unavailable");
            return Err(ClientError::Unavailable {
                status: status.as_u16(),
            });
        }
        None => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    tracing::debug!(status = status.as_u16(), %message, "Proxy call failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}
