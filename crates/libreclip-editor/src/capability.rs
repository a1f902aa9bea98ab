//! The narrow capability interface over the embedded editor widget: the
//! handful of operations the override layer actually uses. The real
//! extension adapts the live widget API to these traits; absence or shape
//! mismatch on the widget side surfaces as errors here, never as a crash.

use crate::position::SelectionRange;
use async_trait::async_trait;
use libreclip_foundation::{KeyEvent, OverrideError};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Stable identity the namespace assigns to each widget instance. Used for
/// hook-once bookkeeping only; the widget owns the instance's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorId(pub u64);

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

/// Command identifiers routed through the widget's own dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    Copy,
    Cut,
    Paste,
    SelectAll,
    Undo,
    Redo,
}

/// Consulted before the widget dispatches a command; returning `false`
/// drops the command silently.
pub trait CommandFilter: Send + Sync {
    fn allow(&self, command: EditorCommand) -> bool;
}

/// Outcome of a capturing key interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The interceptor handled the event; default handling must not run.
    Consumed,
    /// Yield to the widget's default handling.
    Pass,
}

/// Capturing, non-passive keyboard interceptor on an instance's root
/// interactive surface. Runs before the widget's own listeners.
#[async_trait]
pub trait KeyInterceptor: Send + Sync {
    async fn on_key(&self, ev: KeyEvent) -> KeyDisposition;
}

/// Per-instance option surface. Only the options the override layer reads
/// or writes are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub read_only: bool,
    pub dom_read_only: bool,
    pub context_menu: bool,
    pub select_on_line_numbers: bool,
    pub drag_and_drop: bool,
    pub format_on_paste: bool,
    pub format_on_type: bool,
    pub auto_indent: bool,
    pub auto_closing_brackets: bool,
    pub auto_closing_quotes: bool,
    pub auto_surround: bool,
    pub tab_completion: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        // A representative widget default: restrictive about editing,
        // enthusiastic about auto-formatting.
        Self {
            read_only: false,
            dom_read_only: false,
            context_menu: false,
            select_on_line_numbers: false,
            drag_and_drop: false,
            format_on_paste: true,
            format_on_type: true,
            auto_indent: true,
            auto_closing_brackets: true,
            auto_closing_quotes: true,
            auto_surround: true,
            tab_completion: true,
        }
    }
}

impl EditorOptions {
    pub fn apply(&mut self, patch: &EditorOptionsPatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = patch.$field { self.$field = v; })*
            };
        }
        merge!(
            read_only,
            dom_read_only,
            context_menu,
            select_on_line_numbers,
            drag_and_drop,
            format_on_paste,
            format_on_type,
            auto_indent,
            auto_closing_brackets,
            auto_closing_quotes,
            auto_surround,
            tab_completion
        );
    }
}

/// Partial option update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorOptionsPatch {
    pub read_only: Option<bool>,
    pub dom_read_only: Option<bool>,
    pub context_menu: Option<bool>,
    pub select_on_line_numbers: Option<bool>,
    pub drag_and_drop: Option<bool>,
    pub format_on_paste: Option<bool>,
    pub format_on_type: Option<bool>,
    pub auto_indent: Option<bool>,
    pub auto_closing_brackets: Option<bool>,
    pub auto_closing_quotes: Option<bool>,
    pub auto_surround: Option<bool>,
    pub tab_completion: Option<bool>,
}

impl EditorOptionsPatch {
    /// The open, non-restrictive configuration forced on every instance:
    /// editable, context menu enabled, no artificial read-only flags.
    pub fn open_defaults() -> Self {
        Self {
            read_only: Some(false),
            dom_read_only: Some(false),
            context_menu: Some(true),
            select_on_line_numbers: Some(true),
            drag_and_drop: Some(true),
            ..Self::default()
        }
    }

    /// Disable everything that could rewrite raw pasted text.
    pub fn paste_guard() -> Self {
        Self {
            format_on_paste: Some(false),
            format_on_type: Some(false),
            auto_indent: Some(false),
            auto_closing_brackets: Some(false),
            auto_closing_quotes: Some(false),
            auto_surround: Some(false),
            tab_completion: Some(false),
            ..Self::default()
        }
    }

    /// Restore patch for exactly the fields `paste_guard` disables, taken
    /// from a snapshot captured before the paste.
    pub fn restore_formatting(saved: &EditorOptions) -> Self {
        Self {
            format_on_paste: Some(saved.format_on_paste),
            format_on_type: Some(saved.format_on_type),
            auto_indent: Some(saved.auto_indent),
            auto_closing_brackets: Some(saved.auto_closing_brackets),
            auto_closing_quotes: Some(saved.auto_closing_quotes),
            auto_surround: Some(saved.auto_surround),
            tab_completion: Some(saved.tab_completion),
            ..Self::default()
        }
    }
}

/// The widget's line-oriented document model. Lines are 1-based.
pub trait TextModel: Send + Sync {
    /// Number of lines; a document always has at least one line.
    fn line_count(&self) -> usize;

    fn line_content(&self, line: usize) -> Result<String, OverrideError>;

    /// Whole document joined by `\n`.
    fn full_text(&self) -> String;

    /// Replace `range` with `text` in one edit, bypassing the widget's
    /// command/formatting pipeline.
    fn apply_edit(&self, range: SelectionRange, text: &str) -> Result<(), OverrideError>;
}

/// One running widget instance, as seen through the capability seam. The
/// override layer holds these as back references only; destruction stays
/// with the host widget.
pub trait EditorHandle: Send + Sync + std::fmt::Debug {
    fn id(&self) -> EditorId;

    fn model(&self) -> Result<Arc<dyn TextModel>, OverrideError>;

    fn selection(&self) -> Result<SelectionRange, OverrideError>;

    fn set_selection(&self, range: SelectionRange) -> Result<(), OverrideError>;

    fn focus(&self);

    /// Scroll the viewport so `range` is visible.
    fn reveal(&self, range: SelectionRange);

    fn options(&self) -> EditorOptions;

    fn update_options(&self, patch: &EditorOptionsPatch) -> Result<(), OverrideError>;

    /// Attach a capturing key interceptor. Interceptors run in attach order
    /// until one consumes the event.
    fn subscribe_keys(&self, interceptor: Arc<dyn KeyInterceptor>);

    /// Install the command-dispatch filter.
    fn install_command_filter(&self, filter: Arc<dyn CommandFilter>);

    /// Suppress native copy/cut/paste events on the instance surface
    /// (default prevented, propagation stopped). One-way.
    fn suppress_native_clipboard(&self);

    /// Rendered line text, for extraction when model access fails.
    fn rendered_lines(&self) -> Result<Vec<String>, OverrideError>;
}

/// Instance creation notifications from the widget loader.
#[derive(Clone)]
pub enum InstanceEvent {
    Created(Arc<dyn EditorHandle>),
    /// A paired diff view: both sub-instances need hooking.
    DiffCreated {
        original: Arc<dyn EditorHandle>,
        modified: Arc<dyn EditorHandle>,
    },
}

/// The host-provided editor namespace (the widget's factory/introspection
/// API). May come and go asynchronously as the widget's script loads.
pub trait EditorNamespace: Send + Sync {
    /// Whether the namespace global is reachable yet.
    fn is_available(&self) -> bool;

    /// Every instance currently reachable via the widget's introspection
    /// API.
    fn instances(&self) -> Result<Vec<Arc<dyn EditorHandle>>, OverrideError>;

    /// Options forced onto every future instance at creation time, before
    /// the instance's own configuration applies restrictions.
    fn set_creation_overrides(&self, patch: EditorOptionsPatch) -> Result<(), OverrideError>;

    /// Subscribe to instance-creation notifications (plain and diff-pair).
    fn subscribe_created(&self) -> broadcast::Receiver<InstanceEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_defaults_touch_only_restriction_flags() {
        let patch = EditorOptionsPatch::open_defaults();
        assert_eq!(patch.read_only, Some(false));
        assert_eq!(patch.dom_read_only, Some(false));
        assert_eq!(patch.context_menu, Some(true));
        assert_eq!(patch.format_on_paste, None);
        assert_eq!(patch.auto_indent, None);
    }

    #[test]
    fn paste_guard_roundtrips_through_restore() {
        let mut options = EditorOptions::default();
        let saved = options;

        options.apply(&EditorOptionsPatch::paste_guard());
        assert!(!options.format_on_paste);
        assert!(!options.auto_closing_brackets);
        assert!(!options.tab_completion);
        // Non-formatting options untouched.
        assert_eq!(options.read_only, saved.read_only);

        options.apply(&EditorOptionsPatch::restore_formatting(&saved));
        assert_eq!(options, saved);
    }
}
