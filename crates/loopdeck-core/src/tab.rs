//! Tab view-model and derivation.
//!
//! Tabs are views of sessions. They are derived on demand from the session
//! list plus two pieces of transient state (the pending creation and the
//! set of sessions being deleted) and are never persisted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::session::{sort_sessions, Session};

/// One open tab as presented to the embedder.
///
/// `id` is stable: it equals the backing session id once the session is
/// confirmed, and the pending temp id while creation is in flight. Stable
/// ids keep tabs from remounting or reordering visually when siblings are
/// added or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Stable tab identifier (session id, or `temp-<millis>` while pending)
    pub id: String,
    /// Backing session id; `None` only while creation is in flight
    pub session_id: Option<String>,
    /// Display title
    pub title: String,
    /// Pipeline stage the tab belongs to
    pub stage_priority: i64,
    /// Creation is in flight for this tab
    pub is_creating: bool,
    /// Deletion is in flight for this tab
    pub is_deleting: bool,
}

/// The optimistic placeholder for a session creation in flight.
///
/// At most one pending tab exists at a time, enforced by the controller's
/// phase state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTab {
    /// Locally generated temp id (`temp-<millis>`)
    pub temp_id: String,
    /// Title shown while the remote create is in flight
    pub title: String,
    /// Stage the session is being created under
    pub stage_priority: i64,
}

impl PendingTab {
    /// Creates a pending placeholder with a `temp-<millis>` id.
    pub fn new(title: impl Into<String>, stage_priority: i64) -> Self {
        Self {
            temp_id: format!("temp-{}", chrono::Utc::now().timestamp_millis()),
            title: title.into(),
            stage_priority,
        }
    }

    fn to_tab(&self) -> Tab {
        Tab {
            id: self.temp_id.clone(),
            session_id: None,
            title: self.title.clone(),
            stage_priority: self.stage_priority,
            is_creating: true,
            is_deleting: false,
        }
    }
}

/// Derives the tab list for one stage.
///
/// Order is ascending `created_at` (tie-broken by id), independent of the
/// input order. A pending tab is inserted before the last element so the
/// "add" affordance stays visually anchored at the end while the new tab
/// animates in; with no other tabs it is the only element.
pub fn derive_tabs(
    sessions: &[Session],
    pending: Option<&PendingTab>,
    deleting: &HashSet<String>,
) -> Vec<Tab> {
    let mut sessions: Vec<Session> = sessions.to_vec();
    sort_sessions(&mut sessions);

    let mut tabs: Vec<Tab> = sessions
        .into_iter()
        .map(|session| Tab {
            id: session.id.clone(),
            is_deleting: deleting.contains(&session.id),
            session_id: Some(session.id),
            title: session.title,
            stage_priority: session.stage_priority,
            is_creating: false,
        })
        .collect();

    if let Some(pending) = pending {
        let insert_at = tabs.len().saturating_sub(1);
        tabs.insert(insert_at, pending.to_tab());
    }

    tabs
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
    fn test_tabs_ordered_by_created_at() {
        let sessions = vec![
            session("a", "2024-01-02T00:00:00Z"),
            session("b", "2024-01-01T00:00:00Z"),
        ];
        let tabs = derive_tabs(&sessions, None, &HashSet::new());
        let ids: Vec<&str> = tabs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_pending_tab_inserted_second_to_last() {
        let sessions = vec![
            session("a", "2024-01-02T00:00:00Z"),
            session("b", "2024-01-01T00:00:00Z"),
        ];
        let pending = PendingTab::new("Loop", 1);
        let tabs = derive_tabs(&sessions, Some(&pending), &HashSet::new());
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs[0].id, "b");
        assert!(tabs[1].is_creating);
        assert_eq!(tabs[1].session_id, None);
        assert_eq!(tabs[2].id, "a");
    }

    #[test]
    fn test_pending_tab_alone_when_no_sessions() {
        let pending = PendingTab::new("Loop", 1);
        let tabs = derive_tabs(&[], Some(&pending), &HashSet::new());
        assert_eq!(tabs.len(), 1);
        assert!(tabs[0].is_creating);
        assert!(tabs[0].id.starts_with("temp-"));
    }

    #[test]
    fn test_deleting_marks_come_from_membership() {
        let sessions = vec![session("a", "2024-01-01T00:00:00Z")];
        let deleting: HashSet<String> = ["a".to_string()].into_iter().collect();
        let tabs = derive_tabs(&sessions, None, &deleting);
        assert!(tabs[0].is_deleting);
    }
}
