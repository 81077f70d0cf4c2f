//! Tab controller: derives the open-tab list and owns its lifecycle.
//!
//! Tabs are derived from the mirrored session list plus an optimistic
//! pending tab and a set of deleting marks. All mutations of tab/session
//! state go through this controller; the route binder is the only source
//! for "current session".

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use loopdeck_core::config::LoopdeckConfig;
use loopdeck_core::context::ContextProvider;
use loopdeck_core::error::{LoopdeckError, Result};
use loopdeck_core::session::{sort_sessions, CreateSessionRequest, Session, SessionService};
use loopdeck_core::tab::{derive_tabs, PendingTab, Tab};

use crate::notify::{Notice, Notifier};
use crate::route_binder::RouteBinder;
use crate::store::SessionStore;

/// What the controller is currently doing.
///
/// Overlapping creations and switches are made unrepresentable: a second
/// `add_new_tab` or `set_active_tab` while the phase is busy is a no-op,
/// not a race.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ControllerPhase {
    Idle,
    Creating { temp_id: String },
    Switching,
}

/// Coordinates the open-tab view over the remote session service.
pub struct TabController {
    service: Arc<dyn SessionService>,
    context: Arc<dyn ContextProvider>,
    notifier: Arc<dyn Notifier>,
    binder: RouteBinder,
    store: Arc<SessionStore>,
    config: LoopdeckConfig,
    phase: Mutex<ControllerPhase>,
    pending: RwLock<Option<PendingTab>>,
    deleting: RwLock<HashSet<String>>,
    last_switch: Mutex<Option<Instant>>,
}

impl TabController {
    pub fn new(
        service: Arc<dyn SessionService>,
        context: Arc<dyn ContextProvider>,
        notifier: Arc<dyn Notifier>,
        binder: RouteBinder,
        store: Arc<SessionStore>,
        config: LoopdeckConfig,
    ) -> Self {
        Self {
            service,
            context,
            notifier,
            binder,
            store,
            config,
            phase: Mutex::new(ControllerPhase::Idle),
            pending: RwLock::new(None),
            deleting: RwLock::new(HashSet::new()),
            last_switch: Mutex::new(None),
        }
    }

    /// Derives the tab list for the current stage.
    pub async fn tabs(&self) -> Vec<Tab> {
        let stage = self.binder.stage();
        let sessions: Vec<Session> = self
            .store
            .sessions()
            .await
            .into_iter()
            .filter(|s| stage.is_none_or(|st| s.stage_priority == st))
            .collect();
        let pending = self
            .pending
            .read()
            .await
            .clone()
            .filter(|p| stage.is_none_or(|st| p.stage_priority == st));
        let deleting = self.deleting.read().await.clone();
        derive_tabs(&sessions, pending.as_ref(), &deleting)
    }

    /// The active session marker: pending tab id while a creation is in
    /// flight, otherwise the route's session id. The route is the ultimate
    /// source of truth once a session is confirmed; the pending id is a
    /// temporary override for the optimistic-UI window only.
    pub async fn active_session_id(&self) -> Option<String> {
        if let Some(pending) = self.pending.read().await.as_ref() {
            return Some(pending.temp_id.clone());
        }
        self.binder.session_id()
    }

    /// Whether another tab may be opened.
    pub async fn can_add_new_tab(&self) -> bool {
        self.tabs().await.len() < self.config.max_open_tabs
    }

    /// Re-fetches the session list for the current stage into the store.
    ///
    /// The result is discarded if the user switched stages while the fetch
    /// was in flight.
    pub async fn refresh(&self) -> Result<()> {
        let Some(stage) = self.binder.stage() else {
            return Ok(());
        };
        let sessions = self.service.list_for_stage(stage).await?;
        if self.binder.stage() != Some(stage) {
            tracing::debug!("[TabController] refresh discarded: stage changed mid-fetch");
            return Ok(());
        }
        self.store.set_sessions(sessions).await;
        Ok(())
    }

    /// Opens a new tab: creates a remote session behind an optimistic
    /// pending placeholder, then points the route at the confirmed id.
    ///
    /// Silently returns if a creation is already in flight. Missing
    /// preconditions (user, workspace, stage template) and the tab cap
    /// surface a notice and abort before any remote call.
    ///
    /// # Errors
    ///
    /// `Precondition` if an input is missing or the cap is reached,
    /// `Remote` if the service rejects the creation. Either way the
    /// optimistic state is rolled back.
    pub async fn add_new_tab(&self) -> Result<()> {
        let (request, pending) = {
            let mut phase = self.phase.lock().await;
            if *phase != ControllerPhase::Idle {
                tracing::debug!("[TabController] add_new_tab ignored: controller busy");
                return Ok(());
            }

            let Some(stage) = self.binder.stage() else {
                return Err(self.precondition_failure("No stage selected"));
            };
            let Some(user) = self.context.current_user() else {
                return Err(self.precondition_failure("Sign in to open a new loop"));
            };
            let Some(workspace) = self.context.workspace() else {
                return Err(self.precondition_failure("No workspace selected"));
            };
            if self.context.template_for_stage(stage).is_none() {
                return Err(self.precondition_failure("Stage template is not ready"));
            }
            if self.tabs().await.len() >= self.config.max_open_tabs {
                return Err(self.precondition_failure(&format!(
                    "Tab limit reached ({} open loops)",
                    self.config.max_open_tabs
                )));
            }

            let pending = PendingTab::new(&self.config.default_session_title, stage);
            *phase = ControllerPhase::Creating {
                temp_id: pending.temp_id.clone(),
            };
            let request = CreateSessionRequest {
                name: self.config.default_session_title.clone(),
                user_id: user.id,
                workspace_id: workspace.id,
                stage_priority: stage,
            };
            (request, pending)
        };

        *self.pending.write().await = Some(pending);

        let result = self.create_inner(request).await;

        // The placeholder must not disappear before the route points at a
        // real session, otherwise the UI shows zero active tabs for a
        // frame; create_inner navigates before this clears it.
        *self.pending.write().await = None;
        *self.phase.lock().await = ControllerPhase::Idle;

        if let Err(ref e) = result {
            tracing::warn!("[TabController] session creation failed: {e}");
            self.notifier
                .notify(Notice::error("Could not open a new loop"));
        }
        result.map(|_| ())
    }

    async fn create_inner(&self, request: CreateSessionRequest) -> Result<Session> {
        let session = self.service.create(request).await?;
        tracing::info!("[TabController] created session {}", session.id);
        self.refresh().await?;
        self.binder.navigate_to_session(&session.id, false);
        Ok(session)
    }

    /// Closes a tab: optimistic deleting mark, remote delete, cached
    /// transcript drop, and active-session re-targeting when the closed
    /// tab was focused.
    ///
    /// The deleting mark is removed and the list re-fetched whether the
    /// delete succeeds or fails, so a failed delete never leaves a tab
    /// stuck in a spinner state.
    pub async fn close_tab(&self, tab_id: &str) -> Result<()> {
        let Some(session_id) = self.resolve_session_id(tab_id).await else {
            return Ok(());
        };

        self.deleting.write().await.insert(session_id.clone());

        let result = self.close_inner(&session_id).await;

        if let Err(e) = self.refresh().await {
            tracing::warn!("[TabController] refresh after close failed: {e}");
        }
        self.deleting.write().await.remove(&session_id);

        if let Err(ref e) = result {
            tracing::warn!("[TabController] session delete failed: {e}");
            self.notifier.notify(Notice::error("Could not close the loop"));
        }
        result
    }

    async fn close_inner(&self, session_id: &str) -> Result<()> {
        self.service.delete(session_id).await?;

        // Closing a tab discards its cached transcript; this is the only
        // call site allowed to do so.
        self.store.clear_messages(session_id).await;

        if self.binder.is_current_session(session_id) {
            let stage = self.binder.stage();
            let mut remaining: Vec<Session> = self
                .store
                .sessions()
                .await
                .into_iter()
                .filter(|s| s.id != session_id)
                .filter(|s| stage.is_none_or(|st| s.stage_priority == st))
                .collect();
            sort_sessions(&mut remaining);

            match remaining.first() {
                Some(next) => self.binder.navigate_to_session(&next.id, true),
                None => self.binder.clear_session(),
            }
            self.binder.sync().await;
        }

        Ok(())
    }

    /// Switches focus to a tab. No-op for the already-active tab, for tabs
    /// without a backing session, while another switch or a creation is in
    /// flight, and within the debounce window — rapid double-clicks must
    /// produce exactly one route change.
    pub async fn set_active_tab(&self, tab_id: &str) -> Result<()> {
        let Some(session_id) = self.resolve_session_id(tab_id).await else {
            return Ok(());
        };
        if self.binder.is_current_session(&session_id) {
            return Ok(());
        }

        {
            let mut phase = self.phase.lock().await;
            if *phase != ControllerPhase::Idle {
                tracing::debug!("[TabController] switch ignored: controller busy");
                return Ok(());
            }
            let mut last_switch = self.last_switch.lock().await;
            if let Some(at) = *last_switch {
                if at.elapsed() < Duration::from_millis(self.config.switch_debounce_ms) {
                    tracing::debug!("[TabController] switch ignored: within debounce window");
                    return Ok(());
                }
            }
            *last_switch = Some(Instant::now());
            *phase = ControllerPhase::Switching;
        }

        self.binder.navigate_to_session(&session_id, false);
        self.binder.sync().await;

        *self.phase.lock().await = ControllerPhase::Idle;
        Ok(())
    }

    /// Renames a tab's backing session with an optimistic title echo.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session is not mirrored locally, `Remote` if the
    /// service rejects the rename; the echo is rolled back on failure.
    pub async fn rename_tab(&self, tab_id: &str, title: &str) -> Result<()> {
        let Some(session_id) = self.resolve_session_id(tab_id).await else {
            return Ok(());
        };
        let Some(previous) = self.store.session(&session_id).await else {
            return Err(LoopdeckError::not_found("Session", session_id));
        };

        self.store.set_title(&session_id, title).await;

        if let Err(e) = self.service.rename(&session_id, title).await {
            tracing::warn!("[TabController] rename failed, rolling back echo: {e}");
            self.store.set_title(&session_id, &previous.title).await;
            self.notifier.notify(Notice::error("Could not rename the loop"));
            return Err(e);
        }
        Ok(())
    }

    async fn resolve_session_id(&self, tab_id: &str) -> Option<String> {
        self.tabs()
            .await
            .into_iter()
            .find(|t| t.id == tab_id)
            .and_then(|t| t.session_id)
    }

    fn precondition_failure(&self, message: &str) -> LoopdeckError {
        self.notifier.notify(Notice::error(message));
        LoopdeckError::precondition(message)
    }
}
