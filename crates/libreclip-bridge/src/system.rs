//! The platform clipboard capability and its in-memory stand-in.

use async_trait::async_trait;
use libreclip_foundation::OverrideError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Asynchronous platform clipboard. Both calls may be rejected by the
/// platform (permissions, focus requirements) and both suspend the caller
/// without blocking other event processing.
#[async_trait]
pub trait SystemClipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), OverrideError>;

    async fn read_text(&self) -> Result<String, OverrideError>;
}

/// Scriptable in-memory clipboard. Write and read denial simulate platform
/// permission failures.
pub struct MemoryClipboard {
    cell: Mutex<Option<String>>,
    write_denied: AtomicBool,
    read_denied: AtomicBool,
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new_inner()
    }
}

impl MemoryClipboard {
    fn new_inner() -> Self {
        Self {
            cell: Mutex::new(None),
            write_denied: AtomicBool::new(false),
            read_denied: AtomicBool::new(false),
        }
    }

    pub fn new() -> Self {
        Self::new_inner()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new_inner())
    }

    pub fn deny_writes(&self, denied: bool) {
        self.write_denied.store(denied, Ordering::SeqCst);
    }

    pub fn deny_reads(&self, denied: bool) {
        self.read_denied.store(denied, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<String> {
        self.cell.lock().clone()
    }

    pub fn set_contents(&self, text: &str) {
        *self.cell.lock() = Some(text.to_string());
    }

    /// Number of characters currently held, mostly for log assertions.
    pub fn len(&self) -> usize {
        self.cell.lock().as_ref().map(String::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SystemClipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), OverrideError> {
        if self.write_denied.load(Ordering::SeqCst) {
            return Err(OverrideError::Clipboard(
                "write-text permission denied".into(),
            ));
        }
        *self.cell.lock() = Some(text.to_string());
        Ok(())
    }

    async fn read_text(&self) -> Result<String, OverrideError> {
        if self.read_denied.load(Ordering::SeqCst) {
            return Err(OverrideError::Clipboard(
                "read-text permission denied".into(),
            ));
        }
        Ok(self.cell.lock().clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip() {
        let clipboard = MemoryClipboard::new();
        clipboard.write_text("abc").await.unwrap();
        assert_eq!(clipboard.read_text().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn denial_surfaces_as_clipboard_errors() {
        let clipboard = MemoryClipboard::new();
        clipboard.deny_writes(true);
        let err = clipboard.write_text("abc").await.unwrap_err();
        assert!(matches!(err, OverrideError::Clipboard(_)));

        clipboard.deny_reads(true);
        let err = clipboard.read_text().await.unwrap_err();
        assert!(matches!(err, OverrideError::Clipboard(_)));
    }

    #[tokio::test]
    async fn empty_clipboard_reads_as_empty_string() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read_text().await.unwrap(), "");
    }
}
