//! Editor instance registry: detects the widget namespace (which may load
//! late), hooks every instance exactly once, and keeps watching for new and
//! diff-pair instances for the life of the page.

use crate::capability::{EditorHandle, EditorId, EditorNamespace, EditorOptionsPatch, InstanceEvent};
use crate::config::HookConfig;
use crate::engine::EditorOverride;
use libreclip_bridge::ClipboardBridge;
use libreclip_foundation::{OverrideError, OverrideState, Platform, StateHandle};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace, warn};

/// Undetected → Detected state machine over the host-provided namespace,
/// plus per-instance hook-once bookkeeping. The registry never owns an
/// instance; it only remembers which ids it has already hooked.
pub struct EditorRegistry {
    namespace: Arc<dyn EditorNamespace>,
    bridge: Arc<ClipboardBridge>,
    platform: Platform,
    config: HookConfig,
    state: StateHandle,
    detected: AtomicBool,
    hooked: Mutex<HashSet<EditorId>>,
    watcher: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl EditorRegistry {
    pub fn new(
        namespace: Arc<dyn EditorNamespace>,
        bridge: Arc<ClipboardBridge>,
        platform: Platform,
        config: HookConfig,
        state: StateHandle,
    ) -> Arc<Self> {
        Arc::new(Self {
            namespace,
            bridge,
            platform,
            config,
            state,
            detected: AtomicBool::new(false),
            hooked: Mutex::new(HashSet::new()),
            watcher: Mutex::new(None),
        })
    }

    pub fn widget_available(&self) -> bool {
        self.namespace.is_available()
    }

    pub fn detected(&self) -> bool {
        self.detected.load(Ordering::SeqCst)
    }

    pub fn hooked_count(&self) -> usize {
        self.hooked.lock().len()
    }

    /// Synchronous detection pass, run from every initialization pass and
    /// from mutation notifications. Once detected, further calls are no-ops
    /// until a manual reset.
    pub fn check(self: &Arc<Self>) -> Result<(), OverrideError> {
        if self.detected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if !self.namespace.is_available() {
            self.detected.store(false, Ordering::SeqCst);
            return Err(OverrideError::Detection);
        }
        info!("Editor namespace detected");

        if let Err(e) = self
            .namespace
            .set_creation_overrides(EditorOptionsPatch::open_defaults())
        {
            warn!(error = %e, "Could not force open creation options");
        }

        // Watch for new instances before enumerating existing ones so an
        // instance created mid-pass is not missed; the hook-once markers
        // absorb any overlap.
        self.spawn_created_watcher();

        match self.namespace.instances() {
            Ok(instances) => {
                for editor in instances {
                    self.hook_now(editor);
                }
            }
            Err(e) => warn!(error = %e, "Could not enumerate existing instances"),
        }
        Ok(())
    }

    /// Force the namespace back to Undetected for recovery. The per-instance
    /// hook markers survive so re-detection never double-hooks an instance
    /// that is still alive.
    pub fn reset(&self) {
        self.detected.store(false, Ordering::SeqCst);
        if let Some(handle) = self.watcher.lock().take() {
            handle.abort();
        }
        info!("Editor registry reset to undetected");
    }

    fn spawn_created_watcher(self: &Arc<Self>) {
        let registry = Arc::clone(self);
        let mut rx = self.namespace.subscribe_created();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(InstanceEvent::Created(editor)) => {
                        registry.hook_after_settle(editor);
                    }
                    Ok(InstanceEvent::DiffCreated { original, modified }) => {
                        registry.hook_after_settle(original);
                        registry.hook_after_settle(modified);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Creation stream lagged, re-enumerating instances");
                        if let Ok(instances) = registry.namespace.instances() {
                            for editor in instances {
                                registry.hook_now(editor);
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        if let Some(previous) = self.watcher.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Hook after a short delay so the widget's internal initialization has
    /// settled before we attach.
    fn hook_after_settle(self: &Arc<Self>, editor: Arc<dyn EditorHandle>) {
        let registry = Arc::clone(self);
        let delay = Duration::from_millis(self.config.settle_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            registry.hook_now(editor);
        });
    }

    fn hook_now(&self, editor: Arc<dyn EditorHandle>) {
        let id = editor.id();
        if !self.hooked.lock().insert(id) {
            trace!(editor = %id, "Instance already hooked, skipping");
            return;
        }
        EditorOverride::attach(
            editor,
            Arc::clone(&self.bridge),
            self.platform,
            self.config,
        );
        info!(editor = %id, "Editor instance hooked");
        if self.state.current() == OverrideState::Armed {
            let _ = self.state.transition(OverrideState::Active);
        }
    }
}
