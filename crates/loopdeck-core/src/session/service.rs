//! Session persistence service trait.
//!
//! Defines the interface to the remote service that owns sessions.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// Parameters for creating a session on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    /// Display name for the new session
    pub name: String,
    /// Authenticated user creating the session
    pub user_id: String,
    /// Workspace the session belongs to
    pub workspace_id: String,
    /// Pipeline stage the session is created under
    pub stage_priority: i64,
}

/// An abstract client for the remote session persistence service.
///
/// This trait decouples the coordination layer from the concrete transport
/// (HTTP client, test double, in-memory backend). Calls are asynchronous
/// and may complete out of order; callers are responsible for discarding
/// stale results (see `RouteBinder::is_current_session`).
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Creates a session and returns the confirmed record.
    ///
    /// # Errors
    ///
    /// Returns a `Remote` error if the service rejects the request.
    async fn create(&self, request: CreateSessionRequest) -> Result<Session>;

    /// Lists sessions for a pipeline stage, in no guaranteed order.
    async fn list_for_stage(&self, stage_priority: i64) -> Result<Vec<Session>>;

    /// Deletes a session.
    ///
    /// # Errors
    ///
    /// Returns a `Remote` error on failure; deleting a session that does
    /// not exist is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Renames a session.
    async fn rename(&self, session_id: &str, title: &str) -> Result<()>;
}
