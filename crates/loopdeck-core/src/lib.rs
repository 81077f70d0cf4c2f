//! Domain core for Loopdeck: the session/tab coordination layer of a
//! multi-loop agent chat client.
//!
//! This crate holds the domain models, the traits for external
//! collaborators (session persistence, streaming runs, navigation
//! history), and the pure derivations (tab list, view state). Stateful
//! coordinators live in `loopdeck-application`.

pub mod config;
pub mod context;
pub mod error;
pub mod recovery;
pub mod route;
pub mod session;
pub mod stream;
pub mod tab;
pub mod view;

// Re-export common error type
pub use error::LoopdeckError;
