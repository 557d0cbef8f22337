//! Live streaming session types and connection state machine.
//!
//! The vendor's media transport reports connection changes and speech
//! start/end through callbacks. [`LiveStatus::apply`] folds those callbacks
//! into one typed state so the rest of the client never juggles loose
//! `is_ready` / `is_speaking` flags.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of `POST /api/liveavatar/session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
}

/// Body of `DELETE /api/liveavatar/session`. Both fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionRequest {
    pub session_id: Option<String>,
    pub session_token: Option<String>,
}

/// Body of `POST /api/liveavatar/start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub session_token: Option<String>,
}

/// Session identity handed out by the vendor's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub session_id: String,
    pub session_token: String,
}

/// Credentials for the real-time media transport (LiveKit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCredentials {
    pub livekit_url: String,
    pub livekit_token: String,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Inactive,
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
}

impl SessionState {
    /// Whether the transport may move from `self` to `next`.
    ///
    /// Resetting to `Inactive` is always allowed; it is what a local
    /// cleanup does regardless of where the transport got stuck.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        if next == Inactive || next == self {
            return true;
        }
        matches!(
            (self, next),
            (Inactive, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnecting)
                | (Connecting, Disconnected)
                | (Connected, Disconnecting)
                | (Connected, Disconnected)
                | (Disconnecting, Disconnected)
                | (Disconnected, Connecting)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionState::Inactive => "Inactive",
            SessionState::Connecting => "Connecting...",
            SessionState::Connected => "Connected",
            SessionState::Disconnecting => "Disconnecting...",
            SessionState::Disconnected => "Disconnected",
        }
    }
}

/// Callbacks emitted by the media transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    StreamReady,
    Disconnected { reason: Option<String> },
    SpeakStarted,
    SpeakEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Illegal session transition from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: SessionState,
    pub to: SessionState,
}

/// Folded view of a live session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveStatus {
    pub state: SessionState,
    pub stream_ready: bool,
    pub speaking: bool,
}

impl LiveStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transport event.
    ///
    /// An illegal state change leaves the status untouched and is returned
    /// as an error for the caller to log.
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        match event {
            SessionEvent::StateChanged(next) => {
                if !self.state.can_transition_to(next) {
                    return Err(TransitionError {
                        from: self.state,
                        to: next,
                    });
                }
                self.state = next;
                if matches!(next, SessionState::Disconnected | SessionState::Inactive) {
                    self.stream_ready = false;
                    self.speaking = false;
                }
            }
            SessionEvent::StreamReady => self.stream_ready = true,
            SessionEvent::Disconnected { .. } => {
                self.stream_ready = false;
                self.speaking = false;
            }
            SessionEvent::SpeakStarted => self.speaking = true,
            SessionEvent::SpeakEnded => self.speaking = false,
        }
        Ok(())
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The avatar accepts new text only while connected and idle.
    pub fn can_speak(&self) -> bool {
        self.state == SessionState::Connected && !self.speaking
    }
}
