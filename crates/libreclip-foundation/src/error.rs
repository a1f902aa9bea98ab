use thiserror::Error;

/// Failures the override layer can hit while working against the host page,
/// the widget API, or the platform clipboard. Every variant recovers locally;
/// nothing here is allowed to propagate into the host page.
#[derive(Error, Debug)]
pub enum OverrideError {
    /// The widget namespace is not reachable yet. Retried on the next
    /// scheduled pass or mutation notification, never fatal.
    #[error("editor namespace not available")]
    Detection,

    /// The namespace is present but an expected capability is missing or
    /// misshapen. The failing step is skipped; the rest continue.
    #[error("widget introspection failed at '{step}': {detail}")]
    Introspection { step: &'static str, detail: String },

    /// A platform clipboard call was rejected or threw. Falls through the
    /// bridge's strategy chain; total failure surfaces as false/empty.
    #[error("clipboard operation failed: {0}")]
    Clipboard(String),

    /// A direct document-model mutation failed. The operation reports
    /// non-success and the document is left as the failed call left it.
    #[error("document model edit failed: {0}")]
    ModelEdit(String),

    /// State-machine misuse surfaced as a value instead of a panic.
    #[error("invalid override state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

/// How a failure is handled, mirroring the recovery policy baked into each
/// call site. Useful for logging and for tests asserting the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Retry on the next scheduled pass or mutation notification.
    Retry,
    /// Skip this step, continue with the rest of initialization.
    SkipStep,
    /// Fall through to the next strategy in a fallback chain.
    Fallback,
    /// Report non-success to the caller; no rollback is attempted.
    ReportFailure,
}

impl OverrideError {
    pub fn recovery(&self) -> Recovery {
        match self {
            OverrideError::Detection => Recovery::Retry,
            OverrideError::Introspection { .. } => Recovery::SkipStep,
            OverrideError::Clipboard(_) => Recovery::Fallback,
            OverrideError::ModelEdit(_) => Recovery::ReportFailure,
            OverrideError::InvalidTransition { .. } => Recovery::ReportFailure,
        }
    }

    /// Shorthand for introspection failures built from a missing capability.
    pub fn introspection(step: &'static str, detail: impl Into<String>) -> Self {
        OverrideError::Introspection {
            step,
            detail: detail.into(),
        }
    }
}
