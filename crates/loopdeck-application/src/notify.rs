//! User-visible notices.
//!
//! Operation failures are handled locally at the operation boundary and
//! surfaced to the user through this seam; nothing propagates to the view
//! layer as an unhandled error.

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
    Error,
}

/// A notice for the embedder's toast/banner surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Warning,
            message: message.into(),
        }
    }
}

/// Sink for user-visible notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Fallback notifier that forwards notices to the log.
///
/// Headless embedders (and tests that do not assert on notices) can use
/// this instead of wiring a real toast surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            NoticeSeverity::Info => tracing::info!("[Notice] {}", notice.message),
            NoticeSeverity::Warning => tracing::warn!("[Notice] {}", notice.message),
            NoticeSeverity::Error => tracing::error!("[Notice] {}", notice.message),
        }
    }
}
