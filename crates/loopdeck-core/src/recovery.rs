//! Run error and incomplete-session models.
//!
//! These back the recovery UI: per-session error state with a retry
//! policy, and markers for runs that were left mid-flight.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The last known failure of a streamed run for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    /// Human-readable failure description
    pub message: String,
    /// Whether a retry can ever succeed
    pub is_retriable: bool,
    /// Retries attempted so far
    pub retry_count: u32,
    /// Retry budget
    pub max_retries: u32,
    /// When the next automatic retry fires, if one is scheduled
    pub next_retry_at: Option<DateTime<Utc>>,
    /// A retry is in flight right now
    pub is_retrying: bool,
    /// Agent message the failed run originated from
    pub agent_message_id: String,
}

impl RunError {
    /// Creates a fresh error record with an untouched retry budget.
    pub fn new(
        message: impl Into<String>,
        is_retriable: bool,
        max_retries: u32,
        agent_message_id: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            is_retriable,
            retry_count: 0,
            max_retries,
            next_retry_at: None,
            is_retrying: false,
            agent_message_id: agent_message_id.into(),
        }
    }

    /// Whether another retry is permitted: retriable and under budget.
    pub fn can_retry(&self) -> bool {
        self.is_retriable && self.retry_count < self.max_retries
    }
}

/// What a run was last observed doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunState {
    /// Output was streaming
    Streaming,
    /// Waiting for the agent to produce output
    Waiting,
    /// The run failed
    Error { retriable: bool },
}

/// Marker for a run left mid-flight (e.g., unmount during streaming).
///
/// Created at run start, removed on normal completion, explicit dismissal,
/// or recovery; garbage-collected after a fixed age threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteSession {
    /// Session the run belongs to
    pub session_id: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Last observed run state
    pub last_state: RunState,
}

impl IncompleteSession {
    /// Whether the marker is past its keep-alive window.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.started_at > ttl
    }

    /// Whether the session can still be recovered: not expired, and not
    /// terminally failed.
    pub fn is_recoverable(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.is_expired(now, ttl) {
            return false;
        }
        !matches!(self.last_state, RunState::Error { retriable: false })
    }
}
