//! Route binder: reconciles store state to the navigation route.
//!
//! The route's query parameters are the authoritative source for "current
//! session" and "current stage". All reads of the current session anywhere
//! in the application must go through this binder, never ad hoc state.

use std::sync::Arc;

use tokio::sync::Mutex;

use loopdeck_core::route::{Route, RouteHistory};

use crate::store::SessionStore;

/// Binds the session store to the navigation history.
///
/// Cheap to clone; clones share the same history, store, and observation
/// state.
#[derive(Clone)]
pub struct RouteBinder {
    history: Arc<dyn RouteHistory>,
    store: Arc<SessionStore>,
    /// Session id observed by the last `sync` call
    last_seen: Arc<Mutex<Option<String>>>,
}

impl RouteBinder {
    pub fn new(history: Arc<dyn RouteHistory>, store: Arc<SessionStore>) -> Self {
        Self {
            history,
            store,
            last_seen: Arc::new(Mutex::new(None)),
        }
    }

    /// The session id currently on the route.
    pub fn session_id(&self) -> Option<String> {
        self.history.current().session_id
    }

    /// The stage currently on the route.
    pub fn stage(&self) -> Option<i64> {
        self.history.current().stage
    }

    /// Whether `session_id` is the session currently on the route.
    ///
    /// Asynchronous completions use this as a staleness guard: a fetch that
    /// resolves after the user navigated away must discard its result
    /// rather than apply it to the wrong session.
    pub fn is_current_session(&self, session_id: &str) -> bool {
        self.session_id().as_deref() == Some(session_id)
    }

    /// Rewrites the route's `session_id`; `stage` is untouched.
    pub fn navigate_to_session(&self, session_id: &str, replace: bool) {
        let route = self.history.current().with_session(session_id);
        self.apply(route, replace);
    }

    /// Rewrites `stage` and deletes `session_id`. Switching stages always
    /// clears the session selection.
    pub fn navigate_to_stage(&self, stage_priority: i64, replace: bool) {
        let route = self.history.current().with_stage(stage_priority);
        self.apply(route, replace);
    }

    /// Deletes `session_id` only, replacing (not pushing) history.
    pub fn clear_session(&self) {
        let route = self.history.current().without_session();
        self.apply(route, true);
    }

    fn apply(&self, route: Route, replace: bool) {
        tracing::debug!(
            "[RouteBinder] navigate: session_id={:?} stage={:?} replace={}",
            route.session_id,
            route.stage,
            replace
        );
        if replace {
            self.history.replace(route);
        } else {
            self.history.push(route);
        }
    }

    /// Reconciles observation state with the route. Call on every turn of
    /// the embedder's loop.
    ///
    /// When the route's session id has changed since the last call, the
    /// previously focused session's transient UI state (typing indicator,
    /// streaming flag) is cleared. Its messages are not: in-flight runs
    /// keep accumulating output in the background, and switching focus
    /// must never abort or hide that work.
    pub async fn sync(&self) {
        let current = self.session_id();
        let mut last_seen = self.last_seen.lock().await;
        if *last_seen == current {
            return;
        }
        if let Some(previous) = last_seen.take() {
            tracing::debug!("[RouteBinder] session changed, clearing transient state: {previous}");
            self.store.clear_transient(&previous).await;
        }
        *last_seen = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::RwLock;

    /// Minimal in-memory history for binder tests.
    struct MemoryHistory {
        entries: RwLock<Vec<Route>>,
    }

    impl MemoryHistory {
        fn new(initial: Route) -> Self {
            Self {
                entries: RwLock::new(vec![initial]),
            }
        }

        fn len(&self) -> usize {
            self.entries.read().unwrap().len()
        }
    }

    impl RouteHistory for MemoryHistory {
        fn current(&self) -> Route {
            self.entries.read().unwrap().last().cloned().unwrap_or_default()
        }

        fn push(&self, route: Route) {
            self.entries.write().unwrap().push(route);
        }

        fn replace(&self, route: Route) {
            let mut entries = self.entries.write().unwrap();
            entries.pop();
            entries.push(route);
        }
    }

    fn binder_with(initial: Route) -> (RouteBinder, Arc<MemoryHistory>, Arc<SessionStore>) {
        let history = Arc::new(MemoryHistory::new(initial));
        let store = Arc::new(SessionStore::new());
        let binder = RouteBinder::new(history.clone(), store.clone());
        (binder, history, store)
    }

    #[tokio::test]
    async fn test_stage_switch_clears_session_param() {
        let (binder, _, _) = binder_with(Route {
            session_id: Some("s-1".to_string()),
            stage: Some(1),
        });

        binder.navigate_to_stage(2, false);

        assert_eq!(binder.session_id(), None);
        assert_eq!(binder.stage(), Some(2));
    }

    #[tokio::test]
    async fn test_session_navigation_keeps_stage() {
        let (binder, _, _) = binder_with(Route {
            session_id: None,
            stage: Some(1),
        });

        binder.navigate_to_session("s-2", false);

        assert_eq!(binder.session_id().as_deref(), Some("s-2"));
        assert_eq!(binder.stage(), Some(1));
    }

    #[tokio::test]
    async fn test_clear_session_replaces_history() {
        let (binder, history, _) = binder_with(Route {
            session_id: Some("s-1".to_string()),
            stage: Some(1),
        });
        let before = history.len();

        binder.clear_session();

        assert_eq!(binder.session_id(), None);
        assert_eq!(history.len(), before);
    }

    #[tokio::test]
    async fn test_is_current_session() {
        let (binder, _, _) = binder_with(Route {
            session_id: Some("s-1".to_string()),
            stage: None,
        });
        assert!(binder.is_current_session("s-1"));
        assert!(!binder.is_current_session("s-2"));
    }

    #[tokio::test]
    async fn test_sync_clears_previous_transient_but_not_messages() {
        let (binder, _, store) = binder_with(Route {
            session_id: Some("s-1".to_string()),
            stage: None,
        });
        store.set_typing("s-1", true).await;
        store.append_message("s-1", "partial output").await;
        binder.sync().await;

        binder.navigate_to_session("s-2", false);
        binder.sync().await;

        assert!(!store.transient("s-1").await.is_typing);
        assert_eq!(store.messages("s-1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent_without_route_change() {
        let (binder, _, store) = binder_with(Route {
            session_id: Some("s-1".to_string()),
            stage: None,
        });
        binder.sync().await;
        store.set_typing("s-1", true).await;

        binder.sync().await;

        assert!(store.transient("s-1").await.is_typing);
    }
}
