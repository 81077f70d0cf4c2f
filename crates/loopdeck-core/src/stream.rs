//! Streaming connection service trait.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract client for the streaming-run service.
///
/// Runs are keyed by session id and, for retries, by the originating agent
/// message id. Runs are never cancelled by navigation or tab switches; they
/// keep accumulating output against their session regardless of UI focus.
#[async_trait]
pub trait StreamService: Send + Sync {
    /// Retries a failed run for a session, starting from the originating
    /// agent message.
    async fn retry_run(&self, session_id: &str, agent_message_id: &str) -> Result<()>;

    /// Resumes a run that was left incomplete (e.g., tab closed mid-stream).
    async fn resume_session(&self, session_id: &str) -> Result<()>;

    /// Aborts the run for a session. Only explicit user action calls this.
    async fn abort_run(&self, session_id: &str) -> Result<()>;

    /// Whether output is currently streaming for the session.
    async fn is_streaming(&self, session_id: &str) -> bool;

    /// Whether any stream connection is held open for the session.
    async fn has_active_stream(&self, session_id: &str) -> bool;
}
