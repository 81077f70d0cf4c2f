//! Route state: the query parameters of the embedding page.
//!
//! The route is treated as an immutable fact about what the user is
//! currently looking at. It is the only state that survives a reload;
//! pending tabs and deleting marks are ephemeral.

use serde::{Deserialize, Serialize};

/// The `session_id` / `stage` query parameters as a value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    /// Currently selected session, if any
    pub session_id: Option<String>,
    /// Currently selected pipeline stage, if any
    pub stage: Option<i64>,
}

impl Route {
    /// Returns a copy with a different `session_id`, leaving `stage` alone.
    pub fn with_session(&self, session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            stage: self.stage,
        }
    }

    /// Returns a copy with `session_id` removed.
    pub fn without_session(&self) -> Self {
        Self {
            session_id: None,
            stage: self.stage,
        }
    }

    /// Returns a copy targeting a different stage. The session selection is
    /// always dropped: the destination stage's own sync logic is
    /// responsible for selecting a session.
    pub fn with_stage(&self, stage: i64) -> Self {
        Self {
            session_id: None,
            stage: Some(stage),
        }
    }
}

/// Navigation history backing the route.
///
/// Implementations wrap whatever the embedder uses for navigation (browser
/// history, an in-memory stack for tests and headless embedders).
pub trait RouteHistory: Send + Sync {
    /// The route currently shown.
    fn current(&self) -> Route;

    /// Pushes a new history entry.
    fn push(&self, route: Route);

    /// Replaces the current history entry.
    fn replace(&self, route: Route);
}
