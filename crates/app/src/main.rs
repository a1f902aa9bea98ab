use anyhow::Result;
use libreclip_app::{OverrideConfig, Runtime};
use libreclip_bridge::{MemoryClipboard, SystemClipboard};
use libreclip_editor::{
    EditorHandle, EditorNamespace, Position, SelectionRange, SimNamespace,
};
use libreclip_foundation::{KeyCode, KeyEvent, Platform};
use libreclip_page::{HandlerScope, LifecyclePhase, MemoryElement, MemoryPage, PageHost};
use std::sync::Arc;
use std::time::Duration;

fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .init();
}

/// Drives the override runtime against the in-memory host: a hostile page
/// that blocks selection and clipboard events, plus a widget whose script
/// loads late. Mirrors the sequence a real page would put the runtime
/// through.
#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => OverrideConfig::load(std::path::Path::new(&path))?,
        None => OverrideConfig::default(),
    };
    let platform = Platform::detect();

    let page = Arc::new(MemoryPage::new());
    let namespace = SimNamespace::new(false);
    let clipboard = MemoryClipboard::shared();

    // The hostile page: inline handler slots assigned, blocking attributes
    // on existing content, and fresh registration attempts incoming.
    page.set_inline_handler(HandlerScope::Document, "oncopy");
    page.set_inline_handler(HandlerScope::Window, "onselectstart");
    let guarded = MemoryElement::new();
    guarded.set_attribute("oncopy", "return false");
    guarded.add_class("noselect");
    page.attach_element(Arc::clone(&guarded));

    let runtime = Runtime::new(
        config,
        Arc::clone(&page) as Arc<dyn PageHost>,
        Arc::clone(&namespace) as Arc<dyn EditorNamespace>,
        Arc::clone(&clipboard) as Arc<dyn SystemClipboard>,
        platform,
    );
    runtime.run();

    tracing::info!(status = ?runtime.status(), "After the immediate pass");
    assert!(!page.try_register_listener("copy"), "page re-blocked copy");
    assert!(!guarded.has_attribute("oncopy"));

    page.advance_lifecycle(LifecyclePhase::Interactive);
    page.advance_lifecycle(LifecyclePhase::Loaded);

    // The widget script finishes loading well after window load.
    tokio::time::sleep(Duration::from_millis(50)).await;
    namespace.set_available(true);
    let editor = namespace.create_editor("fn main() {\n    println!(\"hello\");\n}");
    page.attach_element(MemoryElement::new());
    tokio::time::sleep(Duration::from_millis(300)).await;

    tracing::info!(status = ?runtime.status(), "After late widget detection");

    // Select-all, copy, cut, paste, straight through the key interceptor.
    editor.press_key(KeyEvent::command(platform, KeyCode::KeyA)).await;
    editor.press_key(KeyEvent::command(platform, KeyCode::KeyC)).await;
    tracing::info!(
        chars = clipboard.contents().map(|t| t.len()).unwrap_or(0),
        "Whole document copied"
    );

    editor
        .set_selection(SelectionRange::new(Position::new(2, 5), Position::new(2, 23)))
        .expect("sim selection");
    editor.press_key(KeyEvent::command(platform, KeyCode::KeyX)).await;
    tracing::info!(text = %editor.text(), "After cut");

    editor.press_key(KeyEvent::command(platform, KeyCode::KeyV)).await;
    tracing::info!(text = %editor.text(), "After paste (round-tripped)");

    println!("{}", serde_json::to_string_pretty(&runtime.status())?);

    runtime.shutdown();
    Ok(())
}
