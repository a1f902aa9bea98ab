//! # Clipboard bridge
//!
//! The one place that actually touches the platform clipboard. Writes run an
//! ordered strategy chain, first success wins:
//!
//! | Strategy        | Mechanism                                   |
//! |-----------------|---------------------------------------------|
//! | async-api       | Platform asynchronous write-text capability |
//! | staged-command  | Off-screen staging container + legacy copy  |
//!
//! Reads use the asynchronous read capability only and degrade to an empty
//! string; no synchronous read primitive exists in this environment.

pub mod strategy;
pub mod system;

pub use strategy::{AsyncApiWrite, StagedCommandWrite, WriteStrategy};
pub use system::{MemoryClipboard, SystemClipboard};

use libreclip_page::PageHost;
use std::sync::Arc;
use tracing::{debug, warn};

/// `write(text) -> bool`, `read() -> String`. Both suspend at the platform
/// boundary without blocking other event processing; neither is cancellable
/// and neither carries a timeout.
pub struct ClipboardBridge {
    strategies: Vec<Arc<dyn WriteStrategy>>,
    clipboard: Arc<dyn SystemClipboard>,
}

impl ClipboardBridge {
    /// The standard chain: asynchronous platform write, then the legacy
    /// staged copy command.
    pub fn new(clipboard: Arc<dyn SystemClipboard>, page: Arc<dyn PageHost>) -> Self {
        let strategies: Vec<Arc<dyn WriteStrategy>> = vec![
            Arc::new(AsyncApiWrite::new(Arc::clone(&clipboard))),
            Arc::new(StagedCommandWrite::new(page)),
        ];
        Self {
            strategies,
            clipboard,
        }
    }

    /// Try each strategy in order until one succeeds. Returns whether any
    /// strategy reported success. Empty text short-circuits to false.
    pub async fn write(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        for strategy in &self.strategies {
            match strategy.write(text).await {
                Ok(()) => {
                    debug!(
                        strategy = strategy.name(),
                        chars = text.len(),
                        "Clipboard write succeeded"
                    );
                    return true;
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Write strategy failed, falling through");
                }
            }
        }
        warn!("All clipboard write strategies failed");
        false
    }

    /// Asynchronous read; empty string on any failure.
    pub async fn read(&self) -> String {
        match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Clipboard read failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libreclip_page::MemoryPage;

    fn bridge_over(
        clipboard: Arc<MemoryClipboard>,
        page: Arc<MemoryPage>,
    ) -> ClipboardBridge {
        ClipboardBridge::new(clipboard, page)
    }

    #[tokio::test]
    async fn write_prefers_the_async_api() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let page = Arc::new(MemoryPage::new());
        let bridge = bridge_over(clipboard.clone(), page.clone());

        assert!(bridge.write("hello").await);
        assert_eq!(clipboard.contents().as_deref(), Some("hello"));
        // The staging path never ran.
        assert_eq!(page.legacy_clipboard(), None);
    }

    #[tokio::test]
    async fn write_falls_back_to_the_staged_command() {
        let clipboard = Arc::new(MemoryClipboard::new());
        clipboard.deny_writes(true);
        let page = Arc::new(MemoryPage::new());
        let bridge = bridge_over(clipboard.clone(), page.clone());

        assert!(bridge.write("fallback text").await);
        assert_eq!(clipboard.contents(), None);
        assert_eq!(page.legacy_clipboard().as_deref(), Some("fallback text"));
        // The staging container was removed after the copy.
        assert_eq!(page.element_count(), 0);
    }

    #[tokio::test]
    async fn write_reports_false_when_everything_fails() {
        let clipboard = Arc::new(MemoryClipboard::new());
        clipboard.deny_writes(true);
        let page = Arc::new(MemoryPage::new());
        page.set_exec_copy_available(false);
        let bridge = bridge_over(clipboard, page);

        assert!(!bridge.write("doomed").await);
    }

    #[tokio::test]
    async fn empty_text_is_not_written() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let page = Arc::new(MemoryPage::new());
        let bridge = bridge_over(clipboard.clone(), page);

        assert!(!bridge.write("").await);
        assert_eq!(clipboard.contents(), None);
    }

    #[tokio::test]
    async fn read_degrades_to_empty() {
        let clipboard = Arc::new(MemoryClipboard::new());
        clipboard.set_contents("stored");
        let page = Arc::new(MemoryPage::new());
        let bridge = bridge_over(clipboard.clone(), page);

        assert_eq!(bridge.read().await, "stored");

        clipboard.deny_reads(true);
        assert_eq!(bridge.read().await, "");
    }
}
