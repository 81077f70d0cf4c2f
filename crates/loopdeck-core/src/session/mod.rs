//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`) and canonical ordering
//! - `service`: Client trait for the remote persistence service

mod model;
mod service;

// Re-export public API
pub use model::{sort_sessions, Session};
pub use service::{CreateSessionRequest, SessionService};
