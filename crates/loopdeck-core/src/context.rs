//! Workspace context provider trait.
//!
//! Session creation requires an authenticated user, a workspace, and a
//! resolved stage template. The optionality is explicit in the trait
//! signature so callers cannot be unaware that a precondition is missing.

/// The authenticated user, as far as this layer cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
}

/// The workspace the client is operating in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRef {
    pub id: String,
}

/// A resolved pipeline-stage template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTemplate {
    /// Stage this template belongs to
    pub stage_priority: i64,
    /// Component the stage renders with
    pub component_id: String,
}

/// Supplies the ambient context session creation depends on.
///
/// Every accessor returns `Option`: a missing value is a precondition
/// failure the caller must surface, not a silent no-op.
pub trait ContextProvider: Send + Sync {
    /// The authenticated user, if signed in.
    fn current_user(&self) -> Option<UserRef>;

    /// The active workspace, if one is selected.
    fn workspace(&self) -> Option<WorkspaceRef>;

    /// The template for a stage, if resolution has completed.
    fn template_for_stage(&self, stage_priority: i64) -> Option<StageTemplate>;
}
