//! Run error tracking and session recovery.
//!
//! An orthogonal side-store keyed by session id: the last known run error
//! per session with its retry budget, and markers for runs left mid-flight
//! (tab closed during streaming, unmount). Consulted by the recovery UI.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use loopdeck_core::config::LoopdeckConfig;
use loopdeck_core::error::{LoopdeckError, Result};
use loopdeck_core::recovery::{IncompleteSession, RunError, RunState};
use loopdeck_core::stream::StreamService;

/// Error counts across all sessions, for a top-level indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorSummary {
    pub total: usize,
    /// Errors that still have retry budget
    pub retriable: usize,
    /// Terminal errors (non-retriable, or budget exhausted)
    pub non_retriable: usize,
}

struct RetryTimer {
    token: CancellationToken,
}

/// Tracks per-session run errors and incomplete-session markers.
pub struct RecoveryTracker {
    stream: Arc<dyn StreamService>,
    ttl: Duration,
    errors: RwLock<HashMap<String, RunError>>,
    incomplete: RwLock<HashMap<String, IncompleteSession>>,
    timers: Mutex<HashMap<String, RetryTimer>>,
}

impl RecoveryTracker {
    pub fn new(stream: Arc<dyn StreamService>, config: &LoopdeckConfig) -> Self {
        Self {
            stream,
            ttl: Duration::hours(config.incomplete_session_ttl_hours),
            errors: RwLock::new(HashMap::new()),
            incomplete: RwLock::new(HashMap::new()),
            timers: Mutex::new(HashMap::new()),
        }
    }

    // ============================================================================
    // Run error state
    // ============================================================================

    /// Records a run failure for a session, replacing any previous error.
    pub async fn record_run_error(&self, session_id: &str, error: RunError) {
        tracing::debug!(
            "[RecoveryTracker] run error for {session_id}: {} (retriable: {})",
            error.message,
            error.is_retriable
        );
        {
            let mut incomplete = self.incomplete.write().await;
            if let Some(marker) = incomplete.get_mut(session_id) {
                marker.last_state = RunState::Error {
                    retriable: error.is_retriable,
                };
            }
        }
        let mut errors = self.errors.write().await;
        errors.insert(session_id.to_string(), error);
    }

    /// The last known run error for a session, if any.
    pub async fn error(&self, session_id: &str) -> Option<RunError> {
        self.errors.read().await.get(session_id).cloned()
    }

    /// Dismisses a session's error and cancels any scheduled retry.
    pub async fn clear_error(&self, session_id: &str) {
        self.cancel_retry(session_id).await;
        let mut errors = self.errors.write().await;
        errors.remove(session_id);
    }

    /// Error counts across all sessions.
    pub async fn error_summary(&self) -> ErrorSummary {
        let errors = self.errors.read().await;
        let mut summary = ErrorSummary {
            total: errors.len(),
            ..Default::default()
        };
        for error in errors.values() {
            if error.can_retry() {
                summary.retriable += 1;
            } else {
                summary.non_retriable += 1;
            }
        }
        summary
    }

    /// Retries the failed run for a session.
    ///
    /// Consumes one unit of retry budget before delegating to the stream
    /// service with the originating agent message id. On success the error
    /// is cleared; on failure it stays recorded with the spent budget.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session has no recorded error, `Precondition` if
    /// the retry budget is exhausted or the error is not retriable.
    pub async fn retry_run(&self, session_id: &str) -> Result<()> {
        let agent_message_id = {
            let mut errors = self.errors.write().await;
            let error = errors
                .get_mut(session_id)
                .ok_or_else(|| LoopdeckError::not_found("RunError", session_id))?;
            if !error.can_retry() {
                return Err(LoopdeckError::precondition("retry budget exhausted"));
            }
            error.retry_count += 1;
            error.is_retrying = true;
            error.next_retry_at = None;
            error.agent_message_id.clone()
        };

        let result = self.stream.retry_run(session_id, &agent_message_id).await;

        let mut errors = self.errors.write().await;
        match result {
            Ok(()) => {
                tracing::info!("[RecoveryTracker] retry succeeded for {session_id}");
                errors.remove(session_id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[RecoveryTracker] retry failed for {session_id}: {e}");
                if let Some(error) = errors.get_mut(session_id) {
                    error.is_retrying = false;
                }
                Err(e)
            }
        }
    }

    /// Schedules an automatic retry after `delay`, replacing any timer
    /// already scheduled for the session.
    pub async fn schedule_retry(self: &Arc<Self>, session_id: &str, delay: StdDuration) {
        self.cancel_retry(session_id).await;

        {
            let mut errors = self.errors.write().await;
            let Some(error) = errors.get_mut(session_id) else {
                return;
            };
            if !error.can_retry() {
                return;
            }
            error.next_retry_at =
                Some(Utc::now() + Duration::milliseconds(delay.as_millis() as i64));
        }

        let token = CancellationToken::new();
        let mut timers = self.timers.lock().await;
        timers.insert(
            session_id.to_string(),
            RetryTimer {
                token: token.clone(),
            },
        );

        let tracker = self.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Err(e) = tracker.retry_run(&session_id).await {
                        tracing::warn!("[RecoveryTracker] scheduled retry failed for {session_id}: {e}");
                    }
                }
            }
            let mut timers = tracker.timers.lock().await;
            timers.remove(&session_id);
        });
    }

    /// Cancels a scheduled automatic retry for a session. Does not cancel
    /// an in-flight request.
    pub async fn cancel_retry(&self, session_id: &str) {
        let timer = {
            let mut timers = self.timers.lock().await;
            timers.remove(session_id)
        };
        if let Some(timer) = timer {
            timer.token.cancel();
        }
        let mut errors = self.errors.write().await;
        if let Some(error) = errors.get_mut(session_id) {
            error.next_retry_at = None;
        }
    }

    // ============================================================================
    // Incomplete-session markers
    // ============================================================================

    /// Records that a run started for a session.
    pub async fn mark_run_started(&self, session_id: &str) {
        let mut incomplete = self.incomplete.write().await;
        incomplete.insert(
            session_id.to_string(),
            IncompleteSession {
                session_id: session_id.to_string(),
                started_at: Utc::now(),
                last_state: RunState::Waiting,
            },
        );
    }

    /// Updates the last observed state of a session's run.
    pub async fn update_run_state(&self, session_id: &str, state: RunState) {
        let mut incomplete = self.incomplete.write().await;
        if let Some(marker) = incomplete.get_mut(session_id) {
            marker.last_state = state;
        }
    }

    /// Removes the marker on normal completion.
    pub async fn mark_run_completed(&self, session_id: &str) {
        let mut incomplete = self.incomplete.write().await;
        incomplete.remove(session_id);
    }

    /// Explicitly dismisses an incomplete-session marker.
    pub async fn dismiss_incomplete(&self, session_id: &str) {
        let mut incomplete = self.incomplete.write().await;
        incomplete.remove(session_id);
    }

    /// Resumes a run that was left incomplete and drops its marker.
    pub async fn resume_session(&self, session_id: &str) -> Result<()> {
        self.stream.resume_session(session_id).await?;
        self.dismiss_incomplete(session_id).await;
        Ok(())
    }

    /// Drops markers past the keep-alive window. Call once at mount.
    pub async fn sweep_expired(&self) {
        let now = Utc::now();
        let ttl = self.ttl;
        let mut incomplete = self.incomplete.write().await;
        incomplete.retain(|session_id, marker| {
            let keep = !marker.is_expired(now, ttl);
            if !keep {
                tracing::debug!("[RecoveryTracker] dropping expired marker for {session_id}");
            }
            keep
        });
    }

    /// Sessions that can be offered for recovery: unexpired markers whose
    /// last state is not a non-retriable error.
    pub async fn recoverable_sessions(&self) -> Vec<IncompleteSession> {
        let now = Utc::now();
        let ttl = self.ttl;
        let incomplete = self.incomplete.read().await;
        let mut sessions: Vec<IncompleteSession> = incomplete
            .values()
            .filter(|marker| marker.is_recoverable(now, ttl))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        sessions
    }
}
