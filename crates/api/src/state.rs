use std::sync::Arc;
use std::time::Duration;

use avatarcast_vendor::{HeyGenApi, LiveAvatarApi};

use crate::config::ServerConfig;
use crate::sessions::SessionCoordinator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// HeyGen REST client (videos, voices, uploads).
    pub heygen: Arc<HeyGenApi>,
    /// LiveAvatar REST client (streaming avatars, sessions).
    pub liveavatar: Arc<LiveAvatarApi>,
    /// Per-caller streaming session registry.
    pub sessions: Arc<SessionCoordinator>,
}

impl AppState {
    /// Build the vendor clients from configuration.
    ///
    /// Both vendors share one connection pool with the configured timeout.
    pub fn from_config(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.vendor_timeout_secs))
            .build()?;

        let heygen = Arc::new(HeyGenApi::with_client(http.clone(), config.heygen.clone()));
        let liveavatar = Arc::new(LiveAvatarApi::with_client(
            http,
            config.liveavatar.clone(),
        ));
        let sessions = Arc::new(SessionCoordinator::new(
            Arc::clone(&liveavatar),
            config.sessions.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            heygen,
            liveavatar,
            sessions,
        })
    }
}
