//! Concrete backends for Loopdeck.
//!
//! In-memory implementations of the core traits (route history, session
//! service) for tests and headless embedders, plus config file loading.

pub mod config_service;
pub mod memory_history;
pub mod memory_session_service;

pub use config_service::ConfigService;
pub use memory_history::InMemoryRouteHistory;
pub use memory_session_service::InMemorySessionService;
