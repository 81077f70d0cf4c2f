//! Chat view-state resolution.
//!
//! Combines loading flags from auth, template loading, and session sync
//! into one discriminated state for the view layer. The resolution order
//! is deliberate: transient sync windows must render as loading states,
//! never as a flickering "nothing here".

use serde::{Deserialize, Serialize};

use crate::tab::Tab;

/// The single render state consumed by the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChatViewState {
    /// Auth or template resolution still in progress
    Loading,
    /// No stage template is available for the current stage
    NoTemplate,
    /// Sessions exist (or may exist) but local tabs have not caught up
    SessionLoading,
    /// The stage genuinely has no sessions
    NoSessions,
    /// Render the tab with this id
    Ready { active_tab_id: String },
}

/// Inputs to [`resolve_view_state`], snapshotted at render time.
///
/// `tabs` must already be scoped to the current stage.
#[derive(Debug, Clone)]
pub struct ViewInputs<'a> {
    /// Auth or template fetch still in flight
    pub is_loading: bool,
    /// A stage template resolved for the current stage
    pub has_template: bool,
    /// Session list sync in flight
    pub is_syncing: bool,
    /// The backend is known to have sessions for this stage
    pub backend_has_sessions: bool,
    /// Tabs for the current stage
    pub tabs: &'a [Tab],
    /// Active tab id, if any
    pub active_tab_id: Option<&'a str>,
}

/// Resolves the view state. First match wins.
pub fn resolve_view_state(inputs: &ViewInputs<'_>) -> ChatViewState {
    if inputs.is_loading {
        return ChatViewState::Loading;
    }

    if !inputs.has_template {
        return ChatViewState::NoTemplate;
    }

    // Creation in progress must render as content, never as empty.
    if let Some(creating) = inputs.tabs.iter().find(|t| t.is_creating) {
        return ChatViewState::Ready {
            active_tab_id: creating.id.clone(),
        };
    }

    if inputs.tabs.is_empty() {
        // A sync window with zero tabs is not a "nothing here" signal.
        if inputs.is_syncing || inputs.backend_has_sessions {
            return ChatViewState::SessionLoading;
        }
        return ChatViewState::NoSessions;
    }

    // Stale active id falls back to the first tab for the stage.
    let active = inputs
        .active_tab_id
        .and_then(|id| inputs.tabs.iter().find(|t| t.id == id));
    match active {
        Some(tab) => ChatViewState::Ready {
            active_tab_id: tab.id.clone(),
        },
        None => ChatViewState::Ready {
            active_tab_id: inputs.tabs[0].id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: &str) -> Tab {
        Tab {
            id: id.to_string(),
            session_id: Some(id.to_string()),
            title: "Loop".to_string(),
            stage_priority: 1,
            is_creating: false,
            is_deleting: false,
        }
    }

    fn creating_tab(id: &str) -> Tab {
        Tab {
            is_creating: true,
            session_id: None,
            ..tab(id)
        }
    }

    fn inputs<'a>(tabs: &'a [Tab], active: Option<&'a str>) -> ViewInputs<'a> {
        ViewInputs {
            is_loading: false,
            has_template: true,
            is_syncing: false,
            backend_has_sessions: false,
            tabs,
            active_tab_id: active,
        }
    }

    #[test]
    fn test_loading_wins_over_everything() {
        let tabs = vec![creating_tab("temp-1")];
        let mut i = inputs(&tabs, None);
        i.is_loading = true;
        assert_eq!(resolve_view_state(&i), ChatViewState::Loading);
    }

    #[test]
    fn test_missing_template() {
        let mut i = inputs(&[], None);
        i.has_template = false;
        assert_eq!(resolve_view_state(&i), ChatViewState::NoTemplate);
    }

    #[test]
    fn test_creating_tab_renders_as_ready() {
        let tabs = vec![tab("a"), creating_tab("temp-1")];
        let mut i = inputs(&tabs, None);
        i.is_syncing = true;
        assert_eq!(
            resolve_view_state(&i),
            ChatViewState::Ready {
                active_tab_id: "temp-1".to_string()
            }
        );
    }

    #[test]
    fn test_sync_window_is_not_no_sessions() {
        let mut i = inputs(&[], None);
        i.is_syncing = true;
        assert_eq!(resolve_view_state(&i), ChatViewState::SessionLoading);
    }

    #[test]
    fn test_backend_ahead_of_local_tabs() {
        let mut i = inputs(&[], None);
        i.backend_has_sessions = true;
        assert_eq!(resolve_view_state(&i), ChatViewState::SessionLoading);
    }

    #[test]
    fn test_truly_empty_stage() {
        let i = inputs(&[], None);
        assert_eq!(resolve_view_state(&i), ChatViewState::NoSessions);
    }

    #[test]
    fn test_stale_active_falls_back_to_first_tab() {
        let tabs = vec![tab("a"), tab("b")];
        let i = inputs(&tabs, Some("gone"));
        assert_eq!(
            resolve_view_state(&i),
            ChatViewState::Ready {
                active_tab_id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_ready_with_matching_active() {
        let tabs = vec![tab("a"), tab("b")];
        let i = inputs(&tabs, Some("b"));
        assert_eq!(
            resolve_view_state(&i),
            ChatViewState::Ready {
                active_tab_id: "b".to_string()
            }
        );
    }
}
