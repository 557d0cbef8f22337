//! Streaming session coordinator.
//!
//! Keeps at most one live avatar session per caller. Opening a session for a
//! caller that already has one stops the previous session at the vendor
//! first. Each caller owns a slot guarded by its own mutex, so create and
//! close for the same caller never interleave, while different callers
//! proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use avatarcast_core::error::CoreError;
use avatarcast_core::streaming::{LiveCredentials, SessionCredentials};
use avatarcast_vendor::{AvatarPersona, LiveAvatarApi};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::error::AppResult;
use crate::middleware::caller::CallerId;

/// Tunables for session creation and teardown.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Voice used when the client does not pick one.
    pub default_voice_id: String,
    /// Language the avatar persona speaks.
    pub language: String,
    /// Pause after stopping a session at the vendor.
    pub stop_settle: Duration,
    /// Extra pause before minting a replacement session.
    pub replace_settle: Duration,
}

/// A session minted for a caller and not yet closed.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub credentials: SessionCredentials,
    pub avatar_id: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Time since the session was minted.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.created_at
    }
}

type Slot = Arc<Mutex<Option<SessionRecord>>>;

pub struct SessionCoordinator {
    api: Arc<LiveAvatarApi>,
    settings: SessionSettings,
    slots: RwLock<HashMap<String, Slot>>,
}

impl SessionCoordinator {
    pub fn new(api: Arc<LiveAvatarApi>, settings: SessionSettings) -> Self {
        Self {
            api,
            settings,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Close the caller's current session, if any, then mint a new one.
    ///
    /// The stop call for the previous session always precedes the token
    /// request. If minting fails the caller is left without a session.
    pub async fn create_session(
        &self,
        caller: &CallerId,
        avatar_id: Option<&str>,
        voice_id: Option<&str>,
    ) -> AppResult<SessionCredentials> {
        let avatar_id = avatar_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::validation("avatarId is required"))?;

        let slot = self.slot(caller).await;
        let result = self.replace_in_slot(&slot, caller, avatar_id, voice_id).await;
        if result.is_err() {
            // A failed mint leaves the slot empty; don't let it linger.
            drop(slot);
            self.prune().await;
        }
        result
    }

    /// Exchange a session token for live-transport credentials.
    pub async fn start_session(&self, session_token: Option<&str>) -> AppResult<LiveCredentials> {
        let token = session_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CoreError::validation("sessionToken is required"))?;

        Ok(self.api.start_session(token).await?)
    }

    /// Stop a session and forget it. Never fails.
    ///
    /// With neither id nor token given, the caller's recorded session is
    /// closed. A recorded session other than the one being closed is kept.
    pub async fn close_session(
        &self,
        caller: &CallerId,
        session_id: Option<&str>,
        session_token: Option<&str>,
    ) {
        let slot = self.slot(caller).await;
        {
            let mut current = slot.lock().await;

            let target = match (session_id, session_token) {
                (Some(id), Some(token)) => Some(SessionCredentials {
                    session_id: id.to_string(),
                    session_token: token.to_string(),
                }),
                _ => current
                    .as_ref()
                    .filter(|r| session_id.map_or(true, |id| id == r.credentials.session_id))
                    .map(|r| r.credentials.clone()),
            };

            match &target {
                Some(credentials) => {
                    if let Some(record) = current
                        .as_ref()
                        .filter(|r| r.credentials.session_id == credentials.session_id)
                    {
                        tracing::info!(
                            caller = %caller,
                            session_id = %record.credentials.session_id,
                            age_secs = record.age().num_seconds(),
                            "Closing streaming session",
                        );
                    }
                    self.stop_best_effort(credentials).await
                }
                None => tracing::debug!(caller = %caller, "No session to stop"),
            }

            let forget = matches!(
                (&*current, &target),
                (Some(record), Some(closed)) if record.credentials.session_id == closed.session_id
            );
            if forget {
                *current = None;
            }

            tokio::time::sleep(self.settings.stop_settle).await;
        }
        drop(slot);
        self.prune().await;
    }

    /// The session currently recorded for `caller`.
    pub async fn current(&self, caller: &CallerId) -> Option<SessionRecord> {
        let slot = self.slots.read().await.get(caller.as_str()).cloned()?;
        let record = slot.lock().await.clone();
        record
    }

    /// Number of callers with a recorded session.
    ///
    /// Does not wait on slots that are mid-create or mid-close; those count
    /// as active.
    pub async fn active_count(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.try_lock().map(|s| s.is_some()).unwrap_or(true))
            .count()
    }

    /// Number of callers holding a registry entry, with or without a session.
    pub async fn registered_callers(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Stop every recorded session. Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let slots: Vec<Slot> = self.slots.write().await.drain().map(|(_, s)| s).collect();
        for slot in slots {
            if let Some(record) = slot.lock().await.take() {
                self.stop_best_effort(&record.credentials).await;
            }
        }
    }

    // ---- private helpers ----

    async fn replace_in_slot(
        &self,
        slot: &Slot,
        caller: &CallerId,
        avatar_id: &str,
        voice_id: Option<&str>,
    ) -> AppResult<SessionCredentials> {
        let mut current = slot.lock().await;

        if let Some(previous) = current.take() {
            tracing::info!(
                caller = %caller,
                session_id = %previous.credentials.session_id,
                age_secs = previous.age().num_seconds(),
                "Closing existing session before creating new one",
            );
            self.stop_best_effort(&previous.credentials).await;
            tokio::time::sleep(self.settings.stop_settle).await;
            tokio::time::sleep(self.settings.replace_settle).await;
        }

        let persona = AvatarPersona {
            voice_id: voice_id
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(self.settings.default_voice_id.as_str())
                .to_string(),
            language: self.settings.language.clone(),
        };

        let credentials = self.api.create_session_token(avatar_id, &persona).await?;

        tracing::info!(
            caller = %caller,
            session_id = %credentials.session_id,
            avatar_id,
            "Created streaming session",
        );

        *current = Some(SessionRecord {
            credentials: credentials.clone(),
            avatar_id: avatar_id.to_string(),
            created_at: Utc::now(),
        });

        Ok(credentials)
    }

    async fn slot(&self, caller: &CallerId) -> Slot {
        if let Some(slot) = self.slots.read().await.get(caller.as_str()) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(caller.as_str().to_string()).or_default())
    }

    /// Drop empty slots nobody else is holding.
    async fn prune(&self) {
        let mut slots = self.slots.write().await;
        slots.retain(|_, slot| {
            Arc::strong_count(slot) > 1
                || slot.try_lock().map(|s| s.is_some()).unwrap_or(true)
        });
    }

    async fn stop_best_effort(&self, credentials: &SessionCredentials) {
        if let Err(e) = self
            .api
            .stop_session(&credentials.session_id, &credentials.session_token)
            .await
        {
            tracing::warn!(
                session_id = %credentials.session_id,
                error = %e,
                "Failed to stop streaming session",
            );
        }
    }
}
