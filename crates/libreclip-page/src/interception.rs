//! Event interception: a standing registration filter that silently drops
//! page attempts to listen for blocklisted event types, plus a one-time
//! clearing of the legacy single-slot handlers on document and window.

use crate::host::{HandlerScope, PageHost, RegistrationFilter};
use crate::policy::InterceptionPolicy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

struct PolicyFilter {
    policy: Arc<InterceptionPolicy>,
}

impl RegistrationFilter for PolicyFilter {
    fn allow(&self, event_type: &str) -> bool {
        let allowed = !self.policy.blocks(event_type);
        if !allowed {
            trace!(event_type, "Dropped handler registration");
        }
        allowed
    }
}

/// Installs the registration filter exactly once and clears every
/// blocklisted legacy handler slot on each apply.
pub struct EventInterceptor {
    page: Arc<dyn PageHost>,
    policy: Arc<InterceptionPolicy>,
    installed: AtomicBool,
}

impl EventInterceptor {
    pub fn new(page: Arc<dyn PageHost>, policy: InterceptionPolicy) -> Self {
        Self {
            page,
            policy: Arc::new(policy),
            installed: AtomicBool::new(false),
        }
    }

    /// Idempotent. Repeated calls never stack filters; slot clearing is
    /// naturally idempotent and re-runs on every pass.
    pub fn apply(&self) {
        if !self.installed.swap(true, Ordering::SeqCst) {
            self.page.install_registration_filter(Arc::new(PolicyFilter {
                policy: Arc::clone(&self.policy),
            }));
            debug!(
                blocked = self.policy.len(),
                "Registration filter installed"
            );
        }
        for event in self.policy.blocked_events() {
            self.page.clear_inline_handler(HandlerScope::Document, event);
            self.page.clear_inline_handler(HandlerScope::Window, event);
        }
    }

    pub fn policy(&self) -> &InterceptionPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPage;

    #[test]
    fn blocklisted_registrations_are_dropped() {
        let page = Arc::new(MemoryPage::new());
        let interceptor = EventInterceptor::new(page.clone(), InterceptionPolicy::default());
        interceptor.apply();

        for ev in ["copy", "cut", "paste", "selectstart", "contextmenu", "keydown", "keyup"] {
            assert!(!page.try_register_listener(ev), "'{ev}' should be dropped");
        }
        for ev in ["click", "mousemove", "scroll", "input", "focus"] {
            assert!(page.try_register_listener(ev), "'{ev}' should pass through");
        }
    }

    #[test]
    fn dropping_is_case_insensitive() {
        let page = Arc::new(MemoryPage::new());
        EventInterceptor::new(page.clone(), InterceptionPolicy::default()).apply();
        assert!(!page.try_register_listener("Copy"));
        assert!(!page.try_register_listener("KEYDOWN"));
    }

    #[test]
    fn legacy_slots_are_cleared_on_both_scopes() {
        let page = Arc::new(MemoryPage::new());
        page.set_inline_handler(HandlerScope::Document, "oncopy");
        page.set_inline_handler(HandlerScope::Window, "onpaste");
        page.set_inline_handler(HandlerScope::Document, "onclick");

        EventInterceptor::new(page.clone(), InterceptionPolicy::default()).apply();

        assert!(!page.has_inline_handler(HandlerScope::Document, "oncopy"));
        assert!(!page.has_inline_handler(HandlerScope::Window, "onpaste"));
        // Non-blocklisted slots are left alone.
        assert!(page.has_inline_handler(HandlerScope::Document, "onclick"));
    }

    #[test]
    fn repeated_apply_installs_one_filter() {
        let page = Arc::new(MemoryPage::new());
        let interceptor = EventInterceptor::new(page.clone(), InterceptionPolicy::default());
        interceptor.apply();
        interceptor.apply();
        interceptor.apply();
        assert_eq!(page.filter_installs(), 1);
    }
}
