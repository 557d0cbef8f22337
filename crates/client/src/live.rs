//! Client-side lifecycle of a live avatar session.
//!
//! [`LiveSessionController`] asks the proxy for a session, starts it, hands
//! the resulting credentials to a [`LiveTransport`] and then folds the
//! transport's callbacks into a [`LiveStatus`]. The transport itself (a
//! LiveKit room in practice) stays behind a trait.

use async_trait::async_trait;
use avatarcast_core::streaming::{
    LiveCredentials, LiveStatus, SessionCredentials, SessionEvent, SessionState, TransitionError,
};

use crate::error::ClientError;
use crate::proxy::ProxyClient;

/// The proxy's session endpoints.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn create_session(
        &self,
        avatar_id: &str,
        voice_id: Option<&str>,
    ) -> Result<SessionCredentials, ClientError>;

    async fn start_session(&self, session_token: &str) -> Result<LiveCredentials, ClientError>;

    async fn close_session(
        &self,
        credentials: Option<&SessionCredentials>,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl SessionBackend for ProxyClient {
    async fn create_session(
        &self,
        avatar_id: &str,
        voice_id: Option<&str>,
    ) -> Result<SessionCredentials, ClientError> {
        ProxyClient::create_session(self, avatar_id, voice_id).await
    }

    async fn start_session(&self, session_token: &str) -> Result<LiveCredentials, ClientError> {
        ProxyClient::start_session(self, session_token).await
    }

    async fn close_session(
        &self,
        credentials: Option<&SessionCredentials>,
    ) -> Result<(), ClientError> {
        ProxyClient::close_session(self, credentials).await
    }
}

/// Real-time media connection to a started session.
///
/// Implementations report progress back through
/// [`LiveSessionController::handle_event`].
#[async_trait]
pub trait LiveTransport: Send + Sync {
    async fn connect(&self, credentials: &LiveCredentials) -> Result<(), ClientError>;

    /// Have the avatar speak `text` verbatim.
    async fn repeat(&self, text: &str) -> Result<(), ClientError>;

    async fn stop(&self) -> Result<(), ClientError>;
}

pub struct LiveSessionController<B, T> {
    backend: B,
    transport: T,
    status: LiveStatus,
    session: Option<SessionCredentials>,
}

impl<B: SessionBackend, T: LiveTransport> LiveSessionController<B, T> {
    pub fn new(backend: B, transport: T) -> Self {
        Self {
            backend,
            transport,
            status: LiveStatus::new(),
            session: None,
        }
    }

    pub fn status(&self) -> LiveStatus {
        self.status
    }

    pub fn session(&self) -> Option<&SessionCredentials> {
        self.session.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open a session for `avatar_id` and connect the transport.
    ///
    /// Any previous session is torn down first. On failure everything set
    /// up so far is torn down again and the error is returned.
    pub async fn start(&mut self, avatar_id: &str, voice_id: Option<&str>) -> Result<(), ClientError> {
        if self.session.is_some() || self.status.state != SessionState::Inactive {
            tracing::info!("Cleaning up previous live session");
            self.stop().await;
        }

        if let Err(e) = self.open(avatar_id, voice_id).await {
            tracing::warn!(avatar_id, error = %e, "Failed to start live session");
            self.stop().await;
            return Err(e);
        }
        Ok(())
    }

    async fn open(&mut self, avatar_id: &str, voice_id: Option<&str>) -> Result<(), ClientError> {
        let credentials = self.backend.create_session(avatar_id, voice_id).await?;
        tracing::info!(session_id = %credentials.session_id, "Live session created");
        let token = credentials.session_token.clone();
        self.session = Some(credentials);

        let live = self.backend.start_session(&token).await?;

        self.status
            .apply(SessionEvent::StateChanged(SessionState::Connecting))
            .map_err(|e| ClientError::InvalidState(e.to_string()))?;
        self.transport.connect(&live).await
    }

    /// Fold one transport callback into the status.
    ///
    /// Illegal transitions leave the status unchanged.
    pub fn handle_event(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        match &event {
            SessionEvent::StateChanged(state) => {
                tracing::debug!(state = state.label(), "Live session state changed")
            }
            SessionEvent::Disconnected { reason } => {
                tracing::info!(reason = ?reason, "Live session disconnected")
            }
            SessionEvent::StreamReady => tracing::info!("Live stream ready"),
            SessionEvent::SpeakStarted | SessionEvent::SpeakEnded => {}
        }

        let result = self.status.apply(event);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Ignoring live session event");
        }
        result
    }

    /// Send `text` to the avatar.
    ///
    /// Only valid while connected and not already speaking. Surrounding
    /// whitespace is trimmed; blank text is refused.
    pub async fn speak(&mut self, text: &str) -> Result<(), ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::InvalidState("Text is required".into()));
        }
        if self.status.state != SessionState::Connected {
            return Err(ClientError::InvalidState(format!(
                "session is {}",
                self.status.state.label()
            )));
        }
        if self.status.speaking {
            return Err(ClientError::InvalidState("avatar is already speaking".into()));
        }

        self.transport.repeat(text).await
    }

    /// Tear the session down. Never fails; problems are logged.
    pub async fn stop(&mut self) {
        if self.status.state != SessionState::Inactive {
            if let Err(e) = self.transport.stop().await {
                tracing::warn!(error = %e, "Failed to stop media transport");
            }
        }

        if let Err(e) = self.backend.close_session(self.session.as_ref()).await {
            tracing::warn!(error = %e, "Failed to close live session");
        }

        self.session = None;
        self.status.reset();
    }
}
