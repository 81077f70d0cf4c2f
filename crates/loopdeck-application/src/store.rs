//! In-memory session store.
//!
//! Holds the canonical mirror of the session list plus transient
//! per-session UI state and cached transcripts. Setters only; the
//! coordinators in this crate own all business logic.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use loopdeck_core::session::Session;

/// Per-session UI state that does not survive a session switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientSessionState {
    /// Typing indicator is showing
    pub is_typing: bool,
    /// A run is streaming output for this session
    pub is_streaming: bool,
    /// When the streaming flag was last raised
    pub streaming_since: Option<DateTime<Utc>>,
}

/// Canonical client-side session state.
///
/// One instance per application root, injected into the coordinators that
/// read and write it. No ambient singletons: the store must be reachable
/// only through constructor-injected references.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<Vec<Session>>,
    transient: RwLock<HashMap<String, TransientSessionState>>,
    messages: RwLock<HashMap<String, Vec<String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the mirrored session list.
    pub async fn set_sessions(&self, sessions: Vec<Session>) {
        let mut guard = self.sessions.write().await;
        *guard = sessions;
    }

    /// Returns a snapshot of the mirrored session list.
    pub async fn sessions(&self) -> Vec<Session> {
        self.sessions.read().await.clone()
    }

    /// Looks up one session by id.
    pub async fn session(&self, session_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.iter().find(|s| s.id == session_id).cloned()
    }

    /// Applies an optimistic title echo to the mirrored session.
    pub async fn set_title(&self, session_id: &str, title: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) {
            session.title = title.to_string();
        }
    }

    /// Returns the transient UI state for a session (default if untouched).
    pub async fn transient(&self, session_id: &str) -> TransientSessionState {
        let transient = self.transient.read().await;
        transient.get(session_id).cloned().unwrap_or_default()
    }

    pub async fn set_typing(&self, session_id: &str, is_typing: bool) {
        let mut transient = self.transient.write().await;
        transient.entry(session_id.to_string()).or_default().is_typing = is_typing;
    }

    pub async fn set_streaming(&self, session_id: &str, is_streaming: bool) {
        let mut transient = self.transient.write().await;
        let state = transient.entry(session_id.to_string()).or_default();
        state.is_streaming = is_streaming;
        state.streaming_since = is_streaming.then(Utc::now);
    }

    /// Clears a session's transient UI state (typing indicator, streaming
    /// flag). Historical messages are not touched: streaming runs continue
    /// in the background and accumulate regardless of which session is
    /// focused, and losing focus must never hide their output.
    pub async fn clear_transient(&self, session_id: &str) {
        let mut transient = self.transient.write().await;
        transient.remove(session_id);
    }

    /// Force-clears streaming flags that have been raised longer than
    /// `max_age`. Bounded cleanup for runs stuck past their expected
    /// duration; the only path besides `clear_transient` that lowers the
    /// flag from outside the stream lifecycle.
    pub async fn force_clear_stale_streaming(&self, max_age: Duration) {
        let now = Utc::now();
        let mut transient = self.transient.write().await;
        for state in transient.values_mut() {
            if state.is_streaming {
                if let Some(since) = state.streaming_since {
                    if now - since > max_age {
                        state.is_streaming = false;
                        state.streaming_since = None;
                    }
                }
            }
        }
    }

    /// Appends to a session's cached transcript.
    pub async fn append_message(&self, session_id: &str, message: impl Into<String>) {
        let mut messages = self.messages.write().await;
        messages
            .entry(session_id.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns a session's cached transcript.
    pub async fn messages(&self, session_id: &str) -> Vec<String> {
        let messages = self.messages.read().await;
        messages.get(session_id).cloned().unwrap_or_default()
    }

    /// Drops a session's cached transcript. Only tab close calls this.
    pub async fn clear_messages(&self, session_id: &str) {
        let mut messages = self.messages.write().await;
        messages.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_transient_keeps_messages() {
        let store = SessionStore::new();
        store.append_message("s-1", "hello").await;
        store.set_typing("s-1", true).await;
        store.set_streaming("s-1", true).await;

        store.clear_transient("s-1").await;

        assert_eq!(store.transient("s-1").await, TransientSessionState::default());
        assert_eq!(store.messages("s-1").await, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_stale_streaming_cleanup() {
        let store = SessionStore::new();
        store.set_streaming("s-1", true).await;

        // Backdate the flag past the timeout.
        {
            let mut transient = store.transient.write().await;
            transient.get_mut("s-1").unwrap().streaming_since =
                Some(Utc::now() - Duration::seconds(700));
        }

        store.force_clear_stale_streaming(Duration::seconds(600)).await;
        assert!(!store.transient("s-1").await.is_streaming);
    }

    #[tokio::test]
    async fn test_fresh_streaming_survives_cleanup() {
        let store = SessionStore::new();
        store.set_streaming("s-1", true).await;
        store.force_clear_stale_streaming(Duration::seconds(600)).await;
        assert!(store.transient("s-1").await.is_streaming);
    }

    #[tokio::test]
    async fn test_title_echo() {
        let store = SessionStore::new();
        store
            .set_sessions(vec![Session::new("s-1", "Loop", 1)])
            .await;
        store.set_title("s-1", "Research").await;
        assert_eq!(store.session("s-1").await.unwrap().title, "Research");
    }
}
