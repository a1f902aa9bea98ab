//! Selection liberation: a global style override plus a continuous cleanup
//! pass that strips selection-blocking attributes and classes from every
//! element, including elements added after startup.

use crate::host::{ElementHandle, MutationRecord, PageHost};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Global rule set forcing selectability and pointer interaction everywhere,
/// keeping the selection highlight visible, and defusing blocking overlays.
const SELECTION_CSS: &str = "\
*, *::before, *::after, ::slotted(*) {\n\
    user-select: text !important;\n\
    -webkit-user-select: text !important;\n\
    -webkit-touch-callout: default !important;\n\
    cursor: auto !important;\n\
}\n\
.editor-container, .editor-container * {\n\
    user-select: text !important;\n\
    pointer-events: auto !important;\n\
}\n\
.text-area-cover {\n\
    pointer-events: none !important;\n\
}\n\
::selection {\n\
    background: #b3d4fc !important;\n\
    color: #000 !important;\n\
}\n\
::shadow * {\n\
    user-select: text !important;\n\
}\n";

/// Inline attributes pages use to veto selection and clipboard events.
pub const BLOCKING_ATTRIBUTES: &[&str] = &[
    "oncopy",
    "oncut",
    "onpaste",
    "onselectstart",
    "oncontextmenu",
    "ondragstart",
    "inert",
    "draggable",
];

/// Class names conventionally paired with `user-select: none` rules.
pub const BLOCKING_CLASSES: &[&str] = &["no-select", "noselect", "unselectable"];

/// Applies the style override and runs the element cleanup, once at startup
/// and incrementally from the page's mutation stream.
pub struct SelectionLiberator {
    page: Arc<dyn PageHost>,
    /// Re-entrancy guard for the sweep, in case mutation delivery nests.
    sweeping: AtomicBool,
}

impl SelectionLiberator {
    pub fn new(page: Arc<dyn PageHost>) -> Self {
        Self {
            page,
            sweeping: AtomicBool::new(false),
        }
    }

    /// Inject the global style rule. Safe to call from every initialization
    /// pass; the rules are declarative, so duplicates stack harmlessly.
    pub fn apply(&self) {
        self.page.inject_style(SELECTION_CSS);
        debug!("Selection override style injected");
    }

    /// Full-document cleanup pass. Skipped if a sweep is already running.
    pub fn sweep(&self) {
        if self.sweeping.swap(true, Ordering::SeqCst) {
            trace!("Sweep already in progress, skipping re-entry");
            return;
        }
        let elements = self.page.elements();
        for element in &elements {
            clean_element(element);
        }
        self.sweeping.store(false, Ordering::SeqCst);
        debug!(count = elements.len(), "Selection sweep completed");
    }

    /// Long-lived reaction to the page's mutation stream: every added or
    /// touched element gets the same cleanup as the startup sweep.
    pub fn spawn_observer(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let liberator = Arc::clone(self);
        let mut rx = liberator.page.subscribe_mutations();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(record) => liberator.react(&record),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        // Fall back to a full sweep; the incremental records
                        // we missed are covered by rescanning everything.
                        warn!(missed, "Mutation stream lagged, resweeping");
                        liberator.sweep();
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn react(&self, record: &MutationRecord) {
        for element in &record.elements {
            clean_element(element);
        }
    }
}

/// Strip blocking attributes and classes and force selectable style on one
/// element. Tolerates elements detached between observation and processing.
fn clean_element(element: &Arc<dyn ElementHandle>) {
    if element.detached() {
        return;
    }
    for attr in BLOCKING_ATTRIBUTES {
        element.remove_attribute(attr);
    }
    element.set_style("user-select", "text");
    element.set_style("-webkit-user-select", "text");
    for class in BLOCKING_CLASSES {
        element.remove_class(class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryElement, MemoryPage};

    fn blocked_element() -> Arc<MemoryElement> {
        let el = MemoryElement::new();
        el.set_attribute("oncopy", "return false");
        el.set_attribute("onselectstart", "return false");
        el.add_class("noselect");
        el
    }

    #[tokio::test]
    async fn sweep_strips_existing_elements() {
        let page = Arc::new(MemoryPage::new());
        let el = blocked_element();
        page.attach_element(el.clone());

        let liberator = SelectionLiberator::new(page);
        liberator.apply();
        liberator.sweep();

        assert!(!el.has_attribute("oncopy"));
        assert!(!el.has_attribute("onselectstart"));
        assert!(!el.has_class("noselect"));
        assert_eq!(el.style("user-select").as_deref(), Some("text"));
    }

    #[tokio::test]
    async fn observer_cleans_late_additions() {
        let page = Arc::new(MemoryPage::new());
        let liberator = Arc::new(SelectionLiberator::new(page.clone()));
        liberator.apply();
        liberator.sweep();
        let handle = liberator.spawn_observer();

        let el = blocked_element();
        page.attach_element(el.clone());
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(!el.has_attribute("oncopy"));
        assert!(!el.has_class("noselect"));
        handle.abort();
    }

    #[tokio::test]
    async fn detached_elements_are_skipped() {
        let page = Arc::new(MemoryPage::new());
        let el = blocked_element();
        el.detach();
        page.attach_element(el.clone());

        let liberator = SelectionLiberator::new(page);
        liberator.sweep();

        // Untouched: the sweep saw a detached node and moved on.
        assert!(el.has_attribute("oncopy"));
    }

    #[tokio::test]
    async fn repeated_apply_is_harmless() {
        let page = Arc::new(MemoryPage::new());
        let liberator = SelectionLiberator::new(page.clone());
        liberator.apply();
        liberator.apply();
        liberator.apply();
        assert_eq!(page.injected_styles().len(), 3);
    }
}
