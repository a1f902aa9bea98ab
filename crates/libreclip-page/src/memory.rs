//! In-memory page host. Backs the test suites and the demo binary with the
//! same observable surface a live page adapter would provide: element
//! attributes/classes/styles, handler registration (filtered), legacy
//! handler slots, a mutation stream, lifecycle phases, a key stream, and a
//! legacy copy-command clipboard cell.

use crate::host::{
    ElementHandle, HandlerScope, LifecyclePhase, MutationKind, MutationRecord, PageHost,
    RegistrationFilter,
};
use libreclip_foundation::KeyEvent;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Scriptable element: attributes, classes, inline styles, text content.
#[derive(Default)]
pub struct MemoryElement {
    attributes: Mutex<HashMap<String, String>>,
    classes: Mutex<HashSet<String>>,
    styles: Mutex<HashMap<String, String>>,
    text: Mutex<String>,
    detached: AtomicBool,
}

impl MemoryElement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .lock()
            .insert(name.to_string(), value.to_string());
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.lock().contains_key(name)
    }

    pub fn add_class(&self, name: &str) {
        self.classes.lock().insert(name.to_string());
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.lock().contains(name)
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.styles.lock().get(property).cloned()
    }

    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}

impl ElementHandle for MemoryElement {
    fn detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.lock().remove(name);
    }

    fn remove_class(&self, name: &str) {
        self.classes.lock().remove(name);
    }

    fn set_style(&self, property: &str, value: &str) {
        self.styles
            .lock()
            .insert(property.to_string(), value.to_string());
    }

    fn set_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }

    fn text(&self) -> String {
        self.text.lock().clone()
    }
}

/// In-memory [`PageHost`]. All mutating page behavior (registrations, slot
/// assignment, element attachment, key presses, lifecycle advancement) is
/// driveable from tests.
pub struct MemoryPage {
    styles: Mutex<Vec<String>>,
    elements: Mutex<Vec<Arc<dyn ElementHandle>>>,
    filter: Mutex<Option<Arc<dyn RegistrationFilter>>>,
    filter_installs: AtomicUsize,
    listeners: Mutex<Vec<String>>,
    inline_handlers: Mutex<HashSet<(HandlerScope, String)>>,
    lifecycle: RwLock<LifecyclePhase>,
    mutations_tx: broadcast::Sender<MutationRecord>,
    lifecycle_tx: broadcast::Sender<LifecyclePhase>,
    keys_tx: broadcast::Sender<KeyEvent>,
    selection: Mutex<Option<String>>,
    exec_copy_available: AtomicBool,
    legacy_clipboard: Mutex<Option<String>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        let (mutations_tx, _) = broadcast::channel(256);
        let (lifecycle_tx, _) = broadcast::channel(16);
        let (keys_tx, _) = broadcast::channel(64);
        Self {
            styles: Mutex::new(Vec::new()),
            elements: Mutex::new(Vec::new()),
            filter: Mutex::new(None),
            filter_installs: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
            inline_handlers: Mutex::new(HashSet::new()),
            lifecycle: RwLock::new(LifecyclePhase::Loading),
            mutations_tx,
            lifecycle_tx,
            keys_tx,
            selection: Mutex::new(None),
            exec_copy_available: AtomicBool::new(true),
            legacy_clipboard: Mutex::new(None),
        }
    }

    /// Attach a scripted element, emitting a child-list mutation record.
    pub fn attach_element(&self, element: Arc<MemoryElement>) {
        let handle: Arc<dyn ElementHandle> = element;
        self.elements.lock().push(Arc::clone(&handle));
        let _ = self.mutations_tx.send(MutationRecord {
            kind: MutationKind::ChildList,
            elements: vec![handle],
        });
    }

    /// Set an attribute on an attached element, emitting an attribute record.
    pub fn mutate_attribute(&self, element: &Arc<MemoryElement>, name: &str, value: &str) {
        element.set_attribute(name, value);
        let handle: Arc<dyn ElementHandle> = Arc::clone(element) as Arc<dyn ElementHandle>;
        let _ = self.mutations_tx.send(MutationRecord {
            kind: MutationKind::Attributes,
            elements: vec![handle],
        });
    }

    /// Page code attempting to register a handler. Returns whether the
    /// registration actually happened; from the page's perspective a drop is
    /// indistinguishable from success.
    pub fn try_register_listener(&self, event_type: &str) -> bool {
        let allowed = self
            .filter
            .lock()
            .as_ref()
            .map(|f| f.allow(event_type))
            .unwrap_or(true);
        if allowed {
            self.listeners.lock().push(event_type.to_string());
        }
        allowed
    }

    pub fn registered_listeners(&self) -> Vec<String> {
        self.listeners.lock().clone()
    }

    pub fn set_inline_handler(&self, scope: HandlerScope, slot: &str) {
        self.inline_handlers
            .lock()
            .insert((scope, slot.to_string()));
    }

    pub fn has_inline_handler(&self, scope: HandlerScope, slot: &str) -> bool {
        self.inline_handlers
            .lock()
            .contains(&(scope, slot.to_string()))
    }

    pub fn filter_installs(&self) -> usize {
        self.filter_installs.load(Ordering::SeqCst)
    }

    pub fn injected_styles(&self) -> Vec<String> {
        self.styles.lock().clone()
    }

    pub fn element_count(&self) -> usize {
        self.elements.lock().len()
    }

    /// Advance the document lifecycle, notifying subscribers.
    pub fn advance_lifecycle(&self, phase: LifecyclePhase) {
        *self.lifecycle.write() = phase;
        let _ = self.lifecycle_tx.send(phase);
    }

    /// Deliver a capturing page-level key event.
    pub fn press_key(&self, ev: KeyEvent) {
        let _ = self.keys_tx.send(ev);
    }

    /// Script whether the legacy copy command reports success.
    pub fn set_exec_copy_available(&self, available: bool) {
        self.exec_copy_available.store(available, Ordering::SeqCst);
    }

    /// What the legacy copy command last captured, if anything.
    pub fn legacy_clipboard(&self) -> Option<String> {
        self.legacy_clipboard.lock().clone()
    }
}

impl PageHost for MemoryPage {
    fn inject_style(&self, css: &str) {
        self.styles.lock().push(css.to_string());
    }

    fn elements(&self) -> Vec<Arc<dyn ElementHandle>> {
        self.elements.lock().clone()
    }

    fn install_registration_filter(&self, filter: Arc<dyn RegistrationFilter>) {
        *self.filter.lock() = Some(filter);
        self.filter_installs.fetch_add(1, Ordering::SeqCst);
    }

    fn clear_inline_handler(&self, scope: HandlerScope, event: &str) {
        // Slots are addressed as on<event> regardless of how the policy
        // spells the event name.
        let slot = if event.starts_with("on") {
            event.to_string()
        } else {
            format!("on{event}")
        };
        self.inline_handlers.lock().remove(&(scope, slot));
    }

    fn subscribe_mutations(&self) -> broadcast::Receiver<MutationRecord> {
        self.mutations_tx.subscribe()
    }

    fn lifecycle(&self) -> LifecyclePhase {
        *self.lifecycle.read()
    }

    fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecyclePhase> {
        self.lifecycle_tx.subscribe()
    }

    fn subscribe_keys(&self) -> broadcast::Receiver<KeyEvent> {
        self.keys_tx.subscribe()
    }

    fn create_element(&self) -> Arc<dyn ElementHandle> {
        let element = MemoryElement::new();
        let handle: Arc<dyn ElementHandle> = element;
        self.elements.lock().push(Arc::clone(&handle));
        handle
    }

    fn select_element_text(&self, element: &Arc<dyn ElementHandle>) {
        *self.selection.lock() = Some(element.text());
    }

    fn exec_copy(&self) -> bool {
        if !self.exec_copy_available.load(Ordering::SeqCst) {
            return false;
        }
        match self.selection.lock().clone() {
            Some(text) => {
                *self.legacy_clipboard.lock() = Some(text);
                true
            }
            None => false,
        }
    }

    fn remove_element(&self, element: &Arc<dyn ElementHandle>) {
        self.elements
            .lock()
            .retain(|el| !Arc::ptr_eq(el, element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrations_pass_without_a_filter() {
        let page = MemoryPage::new();
        assert!(page.try_register_listener("copy"));
        assert_eq!(page.registered_listeners(), vec!["copy".to_string()]);
    }

    #[test]
    fn inline_slot_addressing_accepts_both_spellings() {
        let page = MemoryPage::new();
        page.set_inline_handler(HandlerScope::Document, "oncopy");
        page.clear_inline_handler(HandlerScope::Document, "copy");
        assert!(!page.has_inline_handler(HandlerScope::Document, "oncopy"));

        page.set_inline_handler(HandlerScope::Window, "onpaste");
        page.clear_inline_handler(HandlerScope::Window, "onpaste");
        assert!(!page.has_inline_handler(HandlerScope::Window, "onpaste"));
    }

    #[test]
    fn exec_copy_requires_selection_and_availability() {
        let page = MemoryPage::new();
        assert!(!page.exec_copy());

        let el = page.create_element();
        el.set_text("staged text");
        page.select_element_text(&el);
        assert!(page.exec_copy());
        assert_eq!(page.legacy_clipboard().as_deref(), Some("staged text"));

        page.set_exec_copy_available(false);
        assert!(!page.exec_copy());
    }

    #[tokio::test]
    async fn attach_emits_child_list_record() {
        let page = MemoryPage::new();
        let mut rx = page.subscribe_mutations();
        page.attach_element(MemoryElement::new());
        let record = rx.recv().await.unwrap();
        assert_eq!(record.kind, MutationKind::ChildList);
        assert_eq!(record.elements.len(), 1);
    }
}
