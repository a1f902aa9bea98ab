//! Write strategies, ordered by the bridge and tried until one succeeds.

use crate::system::SystemClipboard;
use async_trait::async_trait;
use libreclip_foundation::OverrideError;
use libreclip_page::PageHost;
use std::sync::Arc;
use tracing::trace;

/// One way of getting text onto the clipboard. Failure means "fall through
/// to the next strategy", never "abort".
#[async_trait]
pub trait WriteStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, text: &str) -> Result<(), OverrideError>;
}

/// The platform's asynchronous write-text capability.
pub struct AsyncApiWrite {
    clipboard: Arc<dyn SystemClipboard>,
}

impl AsyncApiWrite {
    pub fn new(clipboard: Arc<dyn SystemClipboard>) -> Self {
        Self { clipboard }
    }
}

#[async_trait]
impl WriteStrategy for AsyncApiWrite {
    fn name(&self) -> &'static str {
        "async-api"
    }

    async fn write(&self, text: &str) -> Result<(), OverrideError> {
        self.clipboard.write_text(text).await
    }
}

/// The legacy synchronous path: stage the text in an off-screen container,
/// select its full range, invoke the copy command, remove the container.
pub struct StagedCommandWrite {
    page: Arc<dyn PageHost>,
}

impl StagedCommandWrite {
    pub fn new(page: Arc<dyn PageHost>) -> Self {
        Self { page }
    }
}

#[async_trait]
impl WriteStrategy for StagedCommandWrite {
    fn name(&self) -> &'static str {
        "staged-command"
    }

    async fn write(&self, text: &str) -> Result<(), OverrideError> {
        let container = self.page.create_element();
        container.set_style("position", "fixed");
        container.set_style("opacity", "0");
        container.set_style("font-family", "monospace");
        container.set_style("white-space", "pre");
        container.set_text(text);

        self.page.select_element_text(&container);
        let succeeded = self.page.exec_copy();
        self.page.remove_element(&container);

        if succeeded {
            trace!(chars = text.len(), "Legacy copy command succeeded");
            Ok(())
        } else {
            Err(OverrideError::Clipboard(
                "legacy copy command reported failure".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libreclip_page::MemoryPage;

    #[tokio::test]
    async fn staged_write_cleans_up_its_container() {
        let page = Arc::new(MemoryPage::new());
        let strategy = StagedCommandWrite::new(page.clone());

        strategy.write("line one\nline two").await.unwrap();
        assert_eq!(page.legacy_clipboard().as_deref(), Some("line one\nline two"));
        assert_eq!(page.element_count(), 0);
    }

    #[tokio::test]
    async fn staged_write_removes_container_even_on_failure() {
        let page = Arc::new(MemoryPage::new());
        page.set_exec_copy_available(false);
        let strategy = StagedCommandWrite::new(page.clone());

        let err = strategy.write("text").await.unwrap_err();
        assert!(matches!(err, OverrideError::Clipboard(_)));
        assert_eq!(page.element_count(), 0);
    }
}
