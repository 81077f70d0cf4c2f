//! Session domain model.
//!
//! This module contains the core Session entity that represents
//! one chat "loop" mirrored from the remote persistence service.

use serde::{Deserialize, Serialize};

/// A chat loop owned by the remote backend and mirrored client-side.
///
/// Sessions are created and deleted through `SessionService`; the client
/// never mutates them locally except for optimistic title echoes while a
/// rename is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque stable identifier, unique per loop
    pub id: String,
    /// Human-readable title; stays at the placeholder until set
    pub title: String,
    /// Pipeline stage this session belongs to
    pub stage_priority: i64,
    /// Creation timestamp (RFC 3339), used only for stable ordering
    pub created_at: String,
}

impl Session {
    /// Creates a session mirror with the current wall clock as `created_at`.
    pub fn new(id: impl Into<String>, title: impl Into<String>, stage_priority: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            stage_priority,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Sorts sessions into their canonical display order: ascending
/// `created_at`, tie-broken by id so the order is total regardless of
/// fetch order.
pub fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, created_at: &str) -> Session {
        Session {
            id: id.to_string(),
            title: "Loop".to_string(),
            stage_priority: 1,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_sort_is_independent_of_input_order() {
        let mut a = vec![
            session("a", "2024-01-02T00:00:00Z"),
            session("b", "2024-01-01T00:00:00Z"),
        ];
        let mut b = vec![a[1].clone(), a[0].clone()];
        sort_sessions(&mut a);
        sort_sessions(&mut b);
        assert_eq!(a, b);
        assert_eq!(a[0].id, "b");
    }

    #[test]
    fn test_sort_ties_break_by_id() {
        let mut sessions = vec![
            session("z", "2024-01-01T00:00:00Z"),
            session("a", "2024-01-01T00:00:00Z"),
        ];
        sort_sessions(&mut sessions);
        assert_eq!(sessions[0].id, "a");
    }
}
