//! In-memory session service.
//!
//! A HashMap-backed stand-in for the remote persistence service, used by
//! headless embedders, demos, and integration tests. Supports failure
//! injection so error paths can be exercised without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use loopdeck_core::error::{LoopdeckError, Result};
use loopdeck_core::session::{CreateSessionRequest, Session, SessionService};

/// Session backend that lives entirely in process memory.
#[derive(Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<String, Session>>,
    fail_next: AtomicBool,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the backend with existing sessions.
    pub async fn seed(&self, sessions: Vec<Session>) {
        let mut guard = self.sessions.write().await;
        for session in sessions {
            guard.insert(session.id.clone(), session);
        }
    }

    /// Makes the next operation fail with a `Remote` error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LoopdeckError::remote("injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create(&self, request: CreateSessionRequest) -> Result<Session> {
        self.check_failure()?;
        let session = Session::new(
            uuid::Uuid::new_v4().to_string(),
            request.name,
            request.stage_priority,
        );
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        tracing::debug!("[InMemorySessionService] created session {}", session.id);
        Ok(session)
    }

    async fn list_for_stage(&self, stage_priority: i64) -> Result<Vec<Session>> {
        self.check_failure()?;
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.stage_priority == stage_priority)
            .cloned()
            .collect())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.check_failure()?;
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn rename(&self, session_id: &str, title: &str) -> Result<()> {
        self.check_failure()?;
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.title = title.to_string();
                Ok(())
            }
            None => Err(LoopdeckError::not_found("Session", session_id)),
        }
    }
}
