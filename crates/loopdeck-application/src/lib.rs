//! Stateful coordinators for Loopdeck.
//!
//! This crate wires the domain core into running state: the session store,
//! the route binder, the tab controller, and the recovery tracker. All of
//! them are constructor-injected with their collaborators; nothing in this
//! crate reads ambient global state.

pub mod notify;
pub mod recovery;
pub mod route_binder;
pub mod store;
pub mod tab_controller;

pub use notify::{Notice, NoticeSeverity, Notifier, TracingNotifier};
pub use recovery::{ErrorSummary, RecoveryTracker};
pub use route_binder::RouteBinder;
pub use store::{SessionStore, TransientSessionState};
pub use tab_controller::TabController;
