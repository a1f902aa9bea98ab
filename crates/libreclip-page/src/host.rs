//! Capability traits over the host page. The real extension runtime adapts
//! the live document to these; [`crate::memory::MemoryPage`] implements them
//! in-process for tests and the demo binary.

use libreclip_foundation::KeyEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// One element of the page, as far as the override layer is concerned.
///
/// Every method is best-effort and infallible: the sweep runs against nodes
/// that may be malformed or already detached, and must never throw.
pub trait ElementHandle: Send + Sync {
    /// Whether the element has been removed from the page since this handle
    /// was observed. Detached elements are skipped, not errors.
    fn detached(&self) -> bool;

    fn remove_attribute(&self, name: &str);

    fn remove_class(&self, name: &str);

    fn set_style(&self, property: &str, value: &str);

    fn set_text(&self, text: &str);

    /// Rendered text content, used when staging the legacy copy path.
    fn text(&self) -> String;
}

/// Where a legacy single-slot handler (`on<event>`) lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerScope {
    Document,
    Window,
}

/// Document readiness, driving the staggered initialization passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Document still parsing; a DOM-ready pass is still pending.
    Loading,
    /// DOM ready, subresources may still be loading.
    Interactive,
    /// Window load fired.
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
}

/// One batch entry from the page's mutation stream. Carries handles to the
/// elements the batch added or touched so reactions can run incrementally.
#[derive(Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub elements: Vec<Arc<dyn ElementHandle>>,
}

/// Standing decision point consulted on every handler-registration attempt.
/// Returning `false` makes the registration a silent no-op for the caller.
pub trait RegistrationFilter: Send + Sync {
    fn allow(&self, event_type: &str) -> bool;
}

/// The page surface the override engine runs against.
pub trait PageHost: Send + Sync {
    /// Append one global style element. Callers may inject repeatedly; the
    /// rules are declarative and duplicates are tolerated.
    fn inject_style(&self, css: &str);

    /// Snapshot of every element currently attached to the page.
    fn elements(&self) -> Vec<Arc<dyn ElementHandle>>;

    /// Install the standing registration filter. The page consults it for
    /// every future handler registration, on every target.
    fn install_registration_filter(&self, filter: Arc<dyn RegistrationFilter>);

    /// Null out a legacy `on<event>` handler slot.
    fn clear_inline_handler(&self, scope: HandlerScope, event: &str);

    /// Subscribe to the page's mutation stream. Records arrive in the host's
    /// native micro-batches; delivery is synchronous per batch.
    fn subscribe_mutations(&self) -> broadcast::Receiver<MutationRecord>;

    fn lifecycle(&self) -> LifecyclePhase;

    fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecyclePhase>;

    /// Capturing page-level key stream. This does not route through the
    /// registration filter, so the override layer's own chords keep working
    /// while page-registered key handlers stay blocked.
    fn subscribe_keys(&self) -> broadcast::Receiver<KeyEvent>;

    /// Create a detached-from-flow element appended to the page body, used
    /// by the legacy copy staging path.
    fn create_element(&self) -> Arc<dyn ElementHandle>;

    /// Select the full text range of `element`.
    fn select_element_text(&self, element: &Arc<dyn ElementHandle>);

    /// Invoke the legacy synchronous copy command against the current
    /// selection. Returns whether the command reported success.
    fn exec_copy(&self) -> bool;

    fn remove_element(&self, element: &Arc<dyn ElementHandle>);
}
