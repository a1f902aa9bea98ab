//! In-memory editor widget. Implements the full capability seam with a real
//! line buffer so the override behavior is exercisable headlessly; used by
//! the test suites and the demo binary.

use crate::capability::{
    CommandFilter, EditorCommand, EditorHandle, EditorId, EditorNamespace, EditorOptions,
    EditorOptionsPatch, InstanceEvent, KeyDisposition, KeyInterceptor, TextModel,
};
use crate::position::{Position, SelectionRange};
use libreclip_foundation::{KeyEvent, OverrideError};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

static NEXT_EDITOR_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> EditorId {
    EditorId(NEXT_EDITOR_ID.fetch_add(1, Ordering::SeqCst))
}

/// Line-oriented buffer backing a [`SimEditor`].
pub struct SimModel {
    lines: RwLock<Vec<String>>,
    fail_edits: AtomicBool,
}

impl SimModel {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            lines: RwLock::new(text.split('\n').map(str::to_string).collect()),
            fail_edits: AtomicBool::new(false),
        })
    }

    /// Script edit failures to exercise the no-rollback error path.
    pub fn set_fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub fn text(&self) -> String {
        self.lines.read().join("\n")
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }
}

fn char_prefix(line: &str, to_col: usize) -> String {
    line.chars().take(to_col.saturating_sub(1)).collect()
}

fn char_suffix(line: &str, from_col: usize) -> String {
    line.chars().skip(from_col.saturating_sub(1)).collect()
}

impl TextModel for SimModel {
    fn line_count(&self) -> usize {
        self.lines.read().len()
    }

    fn line_content(&self, line: usize) -> Result<String, OverrideError> {
        self.lines
            .read()
            .get(line.saturating_sub(1))
            .cloned()
            .ok_or_else(|| {
                OverrideError::introspection("line_content", format!("line {line} out of range"))
            })
    }

    fn full_text(&self) -> String {
        self.text()
    }

    fn apply_edit(&self, range: SelectionRange, text: &str) -> Result<(), OverrideError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(OverrideError::ModelEdit("scripted edit failure".into()));
        }
        let mut lines = self.lines.write();
        let start = range.start();
        let end = range.end();
        if start.line == 0 || end.line > lines.len() {
            return Err(OverrideError::ModelEdit(format!(
                "range {range} outside document of {} lines",
                lines.len()
            )));
        }

        let prefix = char_prefix(&lines[start.line - 1], start.column);
        let suffix = char_suffix(&lines[end.line - 1], end.column);

        let segments: Vec<&str> = text.split('\n').collect();
        let replacement: Vec<String> = if segments.len() == 1 {
            vec![format!("{prefix}{}{suffix}", segments[0])]
        } else {
            let mut rows = Vec::with_capacity(segments.len());
            rows.push(format!("{prefix}{}", segments[0]));
            for segment in &segments[1..segments.len() - 1] {
                rows.push((*segment).to_string());
            }
            rows.push(format!("{}{suffix}", segments[segments.len() - 1]));
            rows
        };

        lines.splice(start.line - 1..end.line, replacement);
        Ok(())
    }
}

/// Scriptable widget instance: a real model plus the observable hook
/// surface (interceptors, command filter, option state, suppression flag).
pub struct SimEditor {
    id: EditorId,
    model: Arc<SimModel>,
    selection: RwLock<SelectionRange>,
    options: RwLock<EditorOptions>,
    interceptors: Mutex<Vec<Arc<dyn KeyInterceptor>>>,
    command_filter: Mutex<Option<Arc<dyn CommandFilter>>>,
    dispatched: Mutex<Vec<EditorCommand>>,
    clipboard_suppressed: AtomicBool,
    focused: AtomicBool,
    revealed: Mutex<Option<SelectionRange>>,
    fail_model: AtomicBool,
}

impl SimEditor {
    pub fn new(text: &str) -> Arc<Self> {
        Self::with_options(text, EditorOptions::default())
    }

    pub fn with_options(text: &str, options: EditorOptions) -> Arc<Self> {
        Arc::new(Self {
            id: next_id(),
            model: SimModel::new(text),
            selection: RwLock::new(SelectionRange::caret(Position::new(1, 1))),
            options: RwLock::new(options),
            interceptors: Mutex::new(Vec::new()),
            command_filter: Mutex::new(None),
            dispatched: Mutex::new(Vec::new()),
            clipboard_suppressed: AtomicBool::new(false),
            focused: AtomicBool::new(false),
            revealed: Mutex::new(None),
            fail_model: AtomicBool::new(false),
        })
    }

    /// Deliver a key event to the capturing interceptors, in attach order.
    /// Returns whether any interceptor consumed it.
    pub async fn press_key(&self, ev: KeyEvent) -> bool {
        let interceptors: Vec<_> = self.interceptors.lock().clone();
        for interceptor in interceptors {
            if interceptor.on_key(ev).await == KeyDisposition::Consumed {
                return true;
            }
        }
        false
    }

    /// The widget dispatching one of its own commands. Returns whether the
    /// command ran (a filter veto drops it silently).
    pub fn dispatch_command(&self, command: EditorCommand) -> bool {
        let allowed = self
            .command_filter
            .lock()
            .as_ref()
            .map(|f| f.allow(command))
            .unwrap_or(true);
        if allowed {
            self.dispatched.lock().push(command);
        }
        allowed
    }

    pub fn dispatched_commands(&self) -> Vec<EditorCommand> {
        self.dispatched.lock().clone()
    }

    /// Make `model()` fail, exercising the rendered-text fallback.
    pub fn set_fail_model(&self, fail: bool) {
        self.fail_model.store(fail, Ordering::SeqCst);
    }

    pub fn sim_model(&self) -> Arc<SimModel> {
        Arc::clone(&self.model)
    }

    pub fn text(&self) -> String {
        self.model.text()
    }

    pub fn current_selection(&self) -> SelectionRange {
        *self.selection.read()
    }

    pub fn current_options(&self) -> EditorOptions {
        *self.options.read()
    }

    pub fn native_clipboard_suppressed(&self) -> bool {
        self.clipboard_suppressed.load(Ordering::SeqCst)
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    pub fn last_revealed(&self) -> Option<SelectionRange> {
        *self.revealed.lock()
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.lock().len()
    }
}

impl std::fmt::Debug for SimEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimEditor").field("id", &self.id).finish()
    }
}

impl EditorHandle for SimEditor {
    fn id(&self) -> EditorId {
        self.id
    }

    fn model(&self) -> Result<Arc<dyn TextModel>, OverrideError> {
        if self.fail_model.load(Ordering::SeqCst) {
            return Err(OverrideError::introspection(
                "model",
                "model accessor unavailable",
            ));
        }
        Ok(Arc::clone(&self.model) as Arc<dyn TextModel>)
    }

    fn selection(&self) -> Result<SelectionRange, OverrideError> {
        Ok(*self.selection.read())
    }

    fn set_selection(&self, range: SelectionRange) -> Result<(), OverrideError> {
        *self.selection.write() = range;
        Ok(())
    }

    fn focus(&self) {
        self.focused.store(true, Ordering::SeqCst);
    }

    fn reveal(&self, range: SelectionRange) {
        *self.revealed.lock() = Some(range);
    }

    fn options(&self) -> EditorOptions {
        *self.options.read()
    }

    fn update_options(&self, patch: &EditorOptionsPatch) -> Result<(), OverrideError> {
        self.options.write().apply(patch);
        Ok(())
    }

    fn subscribe_keys(&self, interceptor: Arc<dyn KeyInterceptor>) {
        self.interceptors.lock().push(interceptor);
    }

    fn install_command_filter(&self, filter: Arc<dyn CommandFilter>) {
        *self.command_filter.lock() = Some(filter);
    }

    fn suppress_native_clipboard(&self) {
        self.clipboard_suppressed.store(true, Ordering::SeqCst);
    }

    fn rendered_lines(&self) -> Result<Vec<String>, OverrideError> {
        // The rendered view mirrors the buffer even when the model accessor
        // is unavailable; that is exactly what the fallback relies on.
        Ok(self.model.lines())
    }
}

/// The host-provided widget namespace: availability toggling (the widget's
/// script may load late), instance introspection, creation notifications,
/// and forced creation options.
pub struct SimNamespace {
    available: AtomicBool,
    editors: Mutex<Vec<Arc<SimEditor>>>,
    creation_overrides: Mutex<Option<EditorOptionsPatch>>,
    created_tx: broadcast::Sender<InstanceEvent>,
}

impl SimNamespace {
    pub fn new(available: bool) -> Arc<Self> {
        let (created_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            available: AtomicBool::new(available),
            editors: Mutex::new(Vec::new()),
            creation_overrides: Mutex::new(None),
            created_tx,
        })
    }

    /// Simulate the widget script finishing (or un-)loading.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Create an instance through the factory: creation overrides apply
    /// first, then the created notification fires.
    pub fn create_editor(&self, text: &str) -> Arc<SimEditor> {
        let mut options = EditorOptions::default();
        if let Some(overrides) = *self.creation_overrides.lock() {
            options.apply(&overrides);
        }
        let editor = SimEditor::with_options(text, options);
        self.editors.lock().push(Arc::clone(&editor));
        let _ = self
            .created_tx
            .send(InstanceEvent::Created(Arc::clone(&editor) as Arc<dyn EditorHandle>));
        editor
    }

    /// Create a paired diff view: both sub-instances are announced together.
    pub fn create_diff(&self, original: &str, modified: &str) -> (Arc<SimEditor>, Arc<SimEditor>) {
        let mut options = EditorOptions::default();
        if let Some(overrides) = *self.creation_overrides.lock() {
            options.apply(&overrides);
        }
        let left = SimEditor::with_options(original, options);
        let right = SimEditor::with_options(modified, options);
        self.editors.lock().push(Arc::clone(&left));
        self.editors.lock().push(Arc::clone(&right));
        let _ = self.created_tx.send(InstanceEvent::DiffCreated {
            original: Arc::clone(&left) as Arc<dyn EditorHandle>,
            modified: Arc::clone(&right) as Arc<dyn EditorHandle>,
        });
        (left, right)
    }
}

impl EditorNamespace for SimNamespace {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn instances(&self) -> Result<Vec<Arc<dyn EditorHandle>>, OverrideError> {
        if !self.is_available() {
            return Err(OverrideError::Detection);
        }
        Ok(self
            .editors
            .lock()
            .iter()
            .map(|e| Arc::clone(e) as Arc<dyn EditorHandle>)
            .collect())
    }

    fn set_creation_overrides(&self, patch: EditorOptionsPatch) -> Result<(), OverrideError> {
        *self.creation_overrides.lock() = Some(patch);
        Ok(())
    }

    fn subscribe_created(&self) -> broadcast::Receiver<InstanceEvent> {
        self.created_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_splices_single_line_edits() {
        let model = SimModel::new("hello world");
        let range = SelectionRange::new(Position::new(1, 7), Position::new(1, 12));
        model.apply_edit(range, "there").unwrap();
        assert_eq!(model.text(), "hello there");
    }

    #[test]
    fn model_splices_multi_line_replacements() {
        let model = SimModel::new("aaa\nbbb\nccc");
        let range = SelectionRange::new(Position::new(1, 2), Position::new(3, 3));
        model.apply_edit(range, "X\nY").unwrap();
        assert_eq!(model.text(), "aX\nYc");
    }

    #[test]
    fn model_inserts_at_a_caret() {
        let model = SimModel::new("ab");
        model
            .apply_edit(SelectionRange::caret(Position::new(1, 2)), "X\nY")
            .unwrap();
        assert_eq!(model.text(), "aX\nYb");
    }

    #[test]
    fn model_rejects_out_of_range_lines() {
        let model = SimModel::new("one");
        let range = SelectionRange::new(Position::new(1, 1), Position::new(5, 1));
        assert!(model.apply_edit(range, "x").is_err());
        // No partial application.
        assert_eq!(model.text(), "one");
    }

    #[test]
    fn creation_overrides_apply_to_new_instances() {
        let ns = SimNamespace::new(true);
        ns.set_creation_overrides(EditorOptionsPatch::open_defaults())
            .unwrap();
        let editor = ns.create_editor("text");
        assert!(!editor.current_options().read_only);
        assert!(editor.current_options().context_menu);
    }

    #[test]
    fn unavailable_namespace_hides_instances() {
        let ns = SimNamespace::new(false);
        assert!(matches!(
            ns.instances().unwrap_err(),
            OverrideError::Detection
        ));
    }
}
