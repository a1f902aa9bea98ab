//! Registry behavior: late namespace detection, hook-once guarantees across
//! repeated passes, factory and diff-pair hooking, and reset semantics.

use libreclip_bridge::{ClipboardBridge, MemoryClipboard};
use libreclip_editor::{EditorRegistry, HookConfig, SimNamespace};
use libreclip_foundation::{KeyCode, KeyEvent, OverrideState, Platform, StateHandle};
use libreclip_page::MemoryPage;
use std::sync::Arc;
use std::time::Duration;

const PLATFORM: Platform = Platform::Other;

struct Harness {
    namespace: Arc<SimNamespace>,
    registry: Arc<EditorRegistry>,
    clipboard: Arc<MemoryClipboard>,
    state: StateHandle,
}

fn harness(available: bool) -> Harness {
    let namespace = SimNamespace::new(available);
    let clipboard = MemoryClipboard::shared();
    let page = Arc::new(MemoryPage::new());
    let bridge = Arc::new(ClipboardBridge::new(clipboard.clone(), page));
    let state = StateHandle::new();
    let registry = EditorRegistry::new(
        Arc::clone(&namespace) as Arc<dyn libreclip_editor::EditorNamespace>,
        bridge,
        PLATFORM,
        HookConfig::fast(),
        state.clone(),
    );
    Harness {
        namespace,
        registry,
        clipboard,
        state,
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(40)).await;
}

#[tokio::test]
async fn detection_waits_for_the_namespace() {
    let h = harness(false);
    assert!(h.registry.check().is_err());
    assert!(!h.registry.detected());

    h.namespace.set_available(true);
    h.registry.check().unwrap();
    assert!(h.registry.detected());
}

#[tokio::test]
async fn repeated_passes_hook_an_instance_exactly_once() {
    let h = harness(true);
    let editor = h.namespace.create_editor("copy me");

    // Simulate the staggered lifecycle passes racing each other.
    for _ in 0..5 {
        h.registry.check().unwrap();
    }
    assert_eq!(h.registry.hooked_count(), 1);
    assert_eq!(editor.interceptor_count(), 1);

    // One copy chord: exactly one clipboard write, not five.
    editor
        .press_key(KeyEvent::command(PLATFORM, KeyCode::KeyC))
        .await;
    assert_eq!(h.clipboard.contents().as_deref(), Some("copy me"));
    assert_eq!(editor.interceptor_count(), 1);
}

#[tokio::test]
async fn factory_created_instances_are_hooked_after_settling() {
    let h = harness(true);
    h.registry.check().unwrap();

    let editor = h.namespace.create_editor("late arrival");
    // Not yet: the settle delay is still running.
    assert_eq!(editor.interceptor_count(), 0);

    settle().await;
    assert_eq!(editor.interceptor_count(), 1);
    assert_eq!(h.registry.hooked_count(), 1);

    // Creation overrides forced the open configuration before hooking.
    assert!(!editor.current_options().read_only);
    assert!(editor.current_options().context_menu);
}

#[tokio::test]
async fn diff_pairs_hook_both_sub_instances() {
    let h = harness(true);
    h.registry.check().unwrap();

    let (original, modified) = h.namespace.create_diff("left", "right");
    settle().await;

    assert_eq!(original.interceptor_count(), 1);
    assert_eq!(modified.interceptor_count(), 1);
    assert_eq!(h.registry.hooked_count(), 2);
}

#[tokio::test]
async fn reset_forces_redetection_without_double_hooking() {
    let h = harness(true);
    let editor = h.namespace.create_editor("survivor");
    h.registry.check().unwrap();
    assert_eq!(editor.interceptor_count(), 1);

    h.registry.reset();
    assert!(!h.registry.detected());

    // Re-detection re-enumerates but the hook marker survives.
    h.registry.check().unwrap();
    settle().await;
    assert_eq!(editor.interceptor_count(), 1);

    // Instances created after the re-detection still get hooked.
    let newcomer = h.namespace.create_editor("new");
    settle().await;
    assert_eq!(newcomer.interceptor_count(), 1);
}

#[tokio::test]
async fn hooking_promotes_armed_state_to_active() {
    let h = harness(true);
    h.namespace.create_editor("text");
    h.state.transition(OverrideState::Armed).unwrap();

    h.registry.check().unwrap();
    assert_eq!(h.state.current(), OverrideState::Active);
}

#[tokio::test]
async fn no_instances_means_armed_but_not_active() {
    let h = harness(true);
    h.state.transition(OverrideState::Armed).unwrap();
    h.registry.check().unwrap();
    assert_eq!(h.state.current(), OverrideState::Armed);
    assert_eq!(h.registry.hooked_count(), 0);
}
