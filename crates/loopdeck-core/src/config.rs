//! Configuration model for the Loopdeck core.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the session/tab coordination layer.
///
/// All fields have defaults matching the product behavior; a missing or
/// partial config file yields a fully usable configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoopdeckConfig {
    /// Hard cap on concurrently open tabs. Unbounded parallel streaming
    /// sessions are a resource and billing concern.
    #[serde(default = "default_max_open_tabs")]
    pub max_open_tabs: usize,
    /// Window during which repeated session-switch requests are dropped.
    #[serde(default = "default_switch_debounce_ms")]
    pub switch_debounce_ms: u64,
    /// Age after which an incomplete-session marker is garbage-collected.
    #[serde(default = "default_incomplete_session_ttl_hours")]
    pub incomplete_session_ttl_hours: i64,
    /// Age after which a streaming flag is considered stuck and force-cleared.
    #[serde(default = "default_stale_stream_timeout_secs")]
    pub stale_stream_timeout_secs: i64,
    /// Placeholder title for sessions that have not been named yet.
    #[serde(default = "default_session_title")]
    pub default_session_title: String,
}

fn default_max_open_tabs() -> usize {
    15
}

fn default_switch_debounce_ms() -> u64 {
    200
}

fn default_incomplete_session_ttl_hours() -> i64 {
    24
}

fn default_stale_stream_timeout_secs() -> i64 {
    600
}

fn default_session_title() -> String {
    "Loop".to_string()
}

impl Default for LoopdeckConfig {
    fn default() -> Self {
        Self {
            max_open_tabs: default_max_open_tabs(),
            switch_debounce_ms: default_switch_debounce_ms(),
            incomplete_session_ttl_hours: default_incomplete_session_ttl_hours(),
            stale_stream_timeout_secs: default_stale_stream_timeout_secs(),
            default_session_title: default_session_title(),
        }
    }
}
