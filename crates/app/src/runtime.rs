//! The orchestrator: wires the page-wide layers, the clipboard bridge and
//! the instance registry together, runs them at every lifecycle point, and
//! exposes the manual status/reset surface.

use crate::config::OverrideConfig;
use libreclip_bridge::{ClipboardBridge, SystemClipboard};
use libreclip_editor::{EditorNamespace, EditorRegistry};
use libreclip_foundation::{is_rearm_chord, OverrideState, Platform, StateHandle};
use libreclip_page::{EventInterceptor, InterceptionPolicy, LifecyclePhase, PageHost, SelectionLiberator};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The manual status query: `{ widget_available, hooked, active }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub widget_available: bool,
    pub hooked: bool,
    pub active: bool,
}

/// Page-lifetime override runtime. Every mutating step it schedules is
/// idempotent, so the staggered passes may freely race each other.
pub struct Runtime {
    config: OverrideConfig,
    page: Arc<dyn PageHost>,
    platform: Platform,
    state: StateHandle,
    liberator: Arc<SelectionLiberator>,
    interceptor: Arc<EventInterceptor>,
    registry: Arc<EditorRegistry>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl Runtime {
    pub fn new(
        config: OverrideConfig,
        page: Arc<dyn PageHost>,
        namespace: Arc<dyn EditorNamespace>,
        clipboard: Arc<dyn SystemClipboard>,
        platform: Platform,
    ) -> Arc<Self> {
        let state = StateHandle::new();
        let bridge = Arc::new(ClipboardBridge::new(clipboard, Arc::clone(&page)));
        let policy = InterceptionPolicy::new(config.blocked_events.iter());
        let liberator = Arc::new(SelectionLiberator::new(Arc::clone(&page)));
        let interceptor = Arc::new(EventInterceptor::new(Arc::clone(&page), policy));
        let registry = EditorRegistry::new(namespace, bridge, platform, config.hook, state.clone());
        Arc::new(Self {
            config,
            page,
            platform,
            state,
            liberator,
            interceptor,
            registry,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// One initialization pass: liberation, interception, widget detection.
    /// Safe to call any number of times from any lifecycle point.
    pub fn arm(&self) {
        self.liberator.apply();
        self.liberator.sweep();
        self.interceptor.apply();

        match self.registry.check() {
            Ok(()) => {
                let _ = self.state.transition(OverrideState::Armed);
                if self.registry.hooked_count() > 0 {
                    let _ = self.state.transition(OverrideState::Active);
                }
            }
            Err(e) => {
                // Not fatal: the widget script may simply not have loaded
                // yet; the observers will call back in.
                debug!(error = %e, "Widget detection pending");
            }
        }
    }

    /// Start the runtime: immediate pass, lifecycle-driven passes (DOM
    /// ready, window load plus staggered delays), mutation-driven detection
    /// re-checks, the liberation observer, and the emergency chord watcher.
    pub fn run(self: &Arc<Self>) {
        self.arm();
        let mut tasks = self.tasks.lock();
        tasks.push(self.liberator.spawn_observer());
        tasks.push(self.spawn_lifecycle_watcher());
        tasks.push(self.spawn_mutation_watcher());
        tasks.push(self.spawn_key_watcher());
        info!(phase = ?self.page.lifecycle(), "Override runtime started");
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            widget_available: self.registry.widget_available(),
            hooked: self.state.hooked(),
            active: self.state.active(),
        }
    }

    /// Forced re-initialization: back to unarmed and undetected, then a
    /// fresh arm pass. Instances hooked earlier stay hooked.
    pub fn reset(&self) {
        info!("Manual override reset requested");
        self.registry.reset();
        self.state.reset();
        self.arm();
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Abort the long-lived watcher tasks. Only the demo binary calls this;
    /// in a real page the runtime lives until the page unloads.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }

    fn spawn_lifecycle_watcher(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let runtime = Arc::clone(self);
        let mut rx = self.page.subscribe_lifecycle();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(LifecyclePhase::Loading) => {}
                    Ok(LifecyclePhase::Interactive) => {
                        debug!("DOM ready, re-arming");
                        runtime.arm();
                    }
                    Ok(LifecyclePhase::Loaded) => {
                        debug!("Window load, re-arming with staggered passes");
                        runtime.arm();
                        for delay_ms in runtime.config.post_load_delays_ms.clone() {
                            let rt = Arc::clone(&runtime);
                            tokio::spawn(async move {
                                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                                rt.arm();
                            });
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// While the widget is undetected, any page mutation may mean its script
    /// just finished loading; re-run the pass.
    fn spawn_mutation_watcher(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let runtime = Arc::clone(self);
        let mut rx = self.page.subscribe_mutations();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(_) => {
                        if !runtime.registry.detected() && runtime.registry.widget_available() {
                            runtime.arm();
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Mutation stream lagged in detection watcher");
                        if !runtime.registry.detected() && runtime.registry.widget_available() {
                            runtime.arm();
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn spawn_key_watcher(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let runtime = Arc::clone(self);
        let mut rx = self.page.subscribe_keys();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        if is_rearm_chord(runtime.platform, &ev) {
                            info!("Emergency re-initialization chord received");
                            runtime.reset();
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
