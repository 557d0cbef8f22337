//! Render-status polling.
//!
//! A generation job is polled once right away and then on a fixed interval
//! until it completes, fails, or the caller cancels. There is no backoff and
//! no attempt cap; a job that never settles is polled until cancelled.

use std::time::Duration;

use async_trait::async_trait;
use avatarcast_core::video_status::{VideoStatus, VideoStatusResponse};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::proxy::ProxyClient;

/// Interval between status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(20);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Anything that can report a render job's status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn video_status(&self, video_id: &str) -> Result<VideoStatusResponse, ClientError>;
}

#[async_trait]
impl StatusSource for ProxyClient {
    async fn video_status(&self, video_id: &str) -> Result<VideoStatusResponse, ClientError> {
        ProxyClient::video_status(self, video_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
}

impl PollConfig {
    /// Use `interval`, clamped to the 20–30 second window the vendor's
    /// rate limits tolerate.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// How a poll ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The video rendered; `video_url` is usually set.
    Completed(VideoStatusResponse),
    /// The vendor reported failure, or the proxy refused the lookup.
    Failed { error: Option<String> },
    /// The token was cancelled before a terminal status arrived.
    Cancelled,
}

/// Poll `video_id` until it reaches a terminal status.
///
/// `on_update` sees every status the proxy returns, terminal ones included.
/// An error response from the proxy ends polling as [`PollOutcome::Failed`];
/// a request that never got a response, or one answered by a timeout or
/// gateway page instead of the proxy, is logged and retried on the next
/// tick. Cancelling `cancel` stops polling at once, even mid-request, and no
/// further update is delivered.
pub async fn poll_until_terminal<S, F>(
    source: &S,
    video_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_update: F,
) -> PollOutcome
where
    S: StatusSource + ?Sized,
    F: FnMut(&VideoStatusResponse),
{
    // The first tick completes immediately.
    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(video_id, attempt, "Status polling cancelled");
                return PollOutcome::Cancelled;
            }
            _ = interval.tick() => {}
        }

        attempt += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(video_id, attempt, "Status polling cancelled");
                return PollOutcome::Cancelled;
            }
            result = source.video_status(video_id) => result,
        };

        match result {
            Ok(status) => {
                on_update(&status);
                match status.status {
                    VideoStatus::Completed => {
                        tracing::info!(video_id, attempt, "Video completed");
                        return PollOutcome::Completed(status);
                    }
                    VideoStatus::Failed => {
                        tracing::warn!(video_id, error = ?status.error, "Video generation failed");
                        return PollOutcome::Failed {
                            error: status.error,
                        };
                    }
                    other => tracing::debug!(video_id, attempt, status = ?other, "Video not ready"),
                }
            }
            Err(ClientError::Api { status, message }) => {
                tracing::warn!(video_id, status, %message, "Status lookup rejected");
                return PollOutcome::Failed {
                    error: Some(message),
                };
            }
            Err(e) => {
                tracing::warn!(video_id, attempt, error = %e, "Status poll failed, will retry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use tokio::time::Instant;

    use super::*;

    /// Replays scripted responses and records when each request arrived.
    struct Scripted {
        responses: Mutex<VecDeque<Result<VideoStatusResponse, ClientError>>>,
        requests: Mutex<Vec<Instant>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<VideoStatusResponse, ClientError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StatusSource for Scripted {
        async fn video_status(&self, _video_id: &str) -> Result<VideoStatusResponse, ClientError> {
            self.requests.lock().unwrap().push(Instant::now());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(status(VideoStatus::Processing)))
        }
    }

    fn status(s: VideoStatus) -> VideoStatusResponse {
        VideoStatusResponse {
            status: s,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_on_interval_until_completed() {
        let completed = VideoStatusResponse {
            status: VideoStatus::Completed,
            video_url: Some("https://cdn/v.mp4".into()),
            ..Default::default()
        };
        let source = Scripted::new(vec![
            Ok(status(VideoStatus::Pending)),
            Ok(status(VideoStatus::Processing)),
            Ok(completed.clone()),
        ]);
        let start = Instant::now();
        let mut seen = Vec::new();

        let outcome = poll_until_terminal(
            &source,
            "vid-1",
            &PollConfig::default(),
            &CancellationToken::new(),
            |s| seen.push(s.status),
        )
        .await;

        assert_eq!(outcome, PollOutcome::Completed(completed));
        assert_eq!(
            seen,
            vec![VideoStatus::Pending, VideoStatus::Processing, VideoStatus::Completed]
        );

        let requests = source.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0] - start, Duration::ZERO);
        assert_eq!(requests[1] - start, Duration::from_secs(20));
        assert_eq!(requests[2] - start, Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn no_request_after_terminal_status() {
        let source = Scripted::new(vec![Ok(status(VideoStatus::Completed))]);

        poll_until_terminal(
            &source,
            "vid-1",
            &PollConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await;
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn vendor_failure_ends_with_its_message() {
        let failed = VideoStatusResponse {
            status: VideoStatus::Failed,
            error: Some("Voice not found".into()),
            ..Default::default()
        };
        let source = Scripted::new(vec![Ok(failed)]);

        let outcome = poll_until_terminal(
            &source,
            "vid-1",
            &PollConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await;

        assert_matches!(outcome, PollOutcome::Failed { error: Some(e) } if e == "Voice not found");
    }

    #[tokio::test(start_paused = true)]
    async fn proxy_error_is_treated_as_failure() {
        let source = Scripted::new(vec![Err(ClientError::Api {
            status: 404,
            message: "Video not found".into(),
        })]);

        let outcome = poll_until_terminal(
            &source,
            "vid-1",
            &PollConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await;

        assert_matches!(outcome, PollOutcome::Failed { error: Some(e) } if e == "Video not found");
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_keep_polling() {
        let source = Scripted::new(vec![
            Err(ClientError::Transport("connection reset".into())),
            Ok(status(VideoStatus::Completed)),
        ]);

        let outcome = poll_until_terminal(
            &source,
            "vid-1",
            &PollConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await;

        assert_matches!(outcome, PollOutcome::Completed(_));
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_proxy_keeps_polling() {
        let source = Scripted::new(vec![
            Err(ClientError::Unavailable { status: 408 }),
            Err(ClientError::Unavailable { status: 502 }),
            Ok(status(VideoStatus::Completed)),
        ]);

        let outcome = poll_until_terminal(
            &source,
            "vid-1",
            &PollConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await;

        assert_matches!(outcome, PollOutcome::Completed(_));
        assert_eq!(source.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let source = Scripted::new(Vec::new());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(50)).await;
            trigger.cancel();
        });

        let outcome =
            poll_until_terminal(&source, "vid-1", &PollConfig::default(), &cancel, |_| {}).await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        // Requests at 0s, 20s and 40s; cancelled before the 60s tick.
        assert_eq!(source.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_issues_no_request() {
        let source = Scripted::new(Vec::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome =
            poll_until_terminal(&source, "vid-1", &PollConfig::default(), &cancel, |_| {}).await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert_eq!(source.request_count(), 0);
    }

    #[test]
    fn interval_is_clamped() {
        assert_eq!(
            PollConfig::with_interval(Duration::from_secs(5)).interval,
            Duration::from_secs(20)
        );
        assert_eq!(
            PollConfig::with_interval(Duration::from_secs(25)).interval,
            Duration::from_secs(25)
        );
        assert_eq!(
            PollConfig::with_interval(Duration::from_secs(90)).interval,
            Duration::from_secs(30)
        );
    }
}
