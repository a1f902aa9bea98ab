//! Model-level edit engine: copy, cut, paste, and select-all implemented
//! directly against the widget's document model, bypassing the widget's own
//! command pipeline entirely.

use crate::capability::{
    CommandFilter, EditorCommand, EditorHandle, EditorOptionsPatch, KeyDisposition,
    KeyInterceptor, TextModel,
};
use crate::config::HookConfig;
use crate::position::{Position, SelectionRange};
use async_trait::async_trait;
use libreclip_bridge::ClipboardBridge;
use libreclip_foundation::{KeyCode, KeyEvent, OverrideError, Platform};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// The four chords the engine owns. Everything else yields to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    SelectAll,
    Copy,
    Cut,
    Paste,
}

/// Platform command modifier + A/C/X/V. Shift and Alt are ignored, matching
/// how the widget itself matches these chords.
pub fn classify_chord(platform: Platform, ev: &KeyEvent) -> Option<EditorAction> {
    if !platform.command_modifier(ev) {
        return None;
    }
    match ev.code {
        KeyCode::KeyA => Some(EditorAction::SelectAll),
        KeyCode::KeyC => Some(EditorAction::Copy),
        KeyCode::KeyX => Some(EditorAction::Cut),
        KeyCode::KeyV => Some(EditorAction::Paste),
        _ => None,
    }
}

/// Full-document range: (1,1) to (lastLine, lastLineLength + 1).
pub fn full_document_range(lines: &[String]) -> SelectionRange {
    let last = lines.len().max(1);
    let last_len = lines.last().map(|l| l.chars().count()).unwrap_or(0);
    SelectionRange::new(Position::new(1, 1), Position::new(last, last_len + 1))
}

/// Exact text covered by a non-empty range: the first line's suffix from the
/// start column, each interior line verbatim, the last line's prefix up to
/// the (exclusive) end column, joined by `\n`.
pub fn extract_text(lines: &[String], range: &SelectionRange) -> String {
    let start = range.start();
    let end = range.end();
    let first = lines
        .get(start.line.saturating_sub(1))
        .map(String::as_str)
        .unwrap_or("");

    if range.single_line() {
        return char_slice(first, start.column, end.column);
    }

    let mut parts = Vec::with_capacity(end.line - start.line + 1);
    parts.push(char_suffix(first, start.column));
    for line in lines
        .iter()
        .take(end.line.saturating_sub(1))
        .skip(start.line)
    {
        parts.push(line.clone());
    }
    let last = lines
        .get(end.line.saturating_sub(1))
        .map(String::as_str)
        .unwrap_or("");
    parts.push(char_prefix(last, end.column));
    parts.join("\n")
}

/// Deterministic caret position after inserting `inserted` at `start`: same
/// line advanced by the inserted length when there is no line break, else
/// the last inserted line at its length + 1.
pub fn paste_caret(start: Position, inserted: &str) -> Position {
    if !inserted.contains('\n') {
        return Position::new(start.line, start.column + inserted.chars().count());
    }
    let breaks = inserted.matches('\n').count();
    let last_len = inserted
        .rsplit('\n')
        .next()
        .unwrap_or("")
        .chars()
        .count();
    Position::new(start.line + breaks, last_len + 1)
}

fn char_suffix(line: &str, from_col: usize) -> String {
    line.chars().skip(from_col.saturating_sub(1)).collect()
}

fn char_prefix(line: &str, to_col: usize) -> String {
    line.chars().take(to_col.saturating_sub(1)).collect()
}

fn char_slice(line: &str, from_col: usize, to_col: usize) -> String {
    line.chars()
        .skip(from_col.saturating_sub(1))
        .take(to_col.saturating_sub(from_col))
        .collect()
}

fn model_lines(model: &Arc<dyn TextModel>) -> Result<Vec<String>, OverrideError> {
    let count = model.line_count();
    let mut lines = Vec::with_capacity(count);
    for line in 1..=count {
        lines.push(model.line_content(line)?);
    }
    Ok(lines)
}

/// Dropped at the widget's own dispatch layer: the engine fully supersedes
/// these commands.
struct ClipboardCommandFilter;

impl CommandFilter for ClipboardCommandFilter {
    fn allow(&self, command: EditorCommand) -> bool {
        !matches!(
            command,
            EditorCommand::Copy
                | EditorCommand::Cut
                | EditorCommand::Paste
                | EditorCommand::SelectAll
        )
    }
}

/// One hooked instance: owns the keyboard interception and performs every
/// clipboard operation against the document model.
pub struct EditorOverride {
    editor: Arc<dyn EditorHandle>,
    bridge: Arc<ClipboardBridge>,
    platform: Platform,
    config: HookConfig,
}

impl EditorOverride {
    /// Force open options, close the widget's own command path, and attach
    /// the capturing key interceptor. Returns the attached override; its
    /// lifetime is tied to the instance's interceptor registration.
    pub fn attach(
        editor: Arc<dyn EditorHandle>,
        bridge: Arc<ClipboardBridge>,
        platform: Platform,
        config: HookConfig,
    ) -> Arc<Self> {
        let id = editor.id();
        if let Err(e) = editor.update_options(&EditorOptionsPatch::open_defaults()) {
            warn!(editor = %id, error = %e, "Could not force open options");
        }
        editor.install_command_filter(Arc::new(ClipboardCommandFilter));
        editor.suppress_native_clipboard();

        let this = Arc::new(Self {
            editor: Arc::clone(&editor),
            bridge,
            platform,
            config,
        });
        editor.subscribe_keys(Arc::clone(&this) as Arc<dyn KeyInterceptor>);
        debug!(editor = %id, "Model-level override attached");
        this
    }

    /// Select the whole document straight from the model, then focus and
    /// reveal the range.
    pub fn select_all(&self) -> Result<(), OverrideError> {
        let model = self.editor.model()?;
        let lines = model_lines(&model)?;
        let range = full_document_range(&lines);
        self.editor.set_selection(range)?;
        self.editor.focus();
        self.editor.reveal(range);
        trace!(editor = %self.editor.id(), %range, "Select-all applied");
        Ok(())
    }

    /// Extract the selection (or the whole document when the selection is
    /// empty) and hand it to the bridge. Falls back to rendered line text
    /// when model access fails.
    pub async fn copy(&self) -> bool {
        let text = match self.extract_for_copy() {
            Ok(text) => text,
            Err(e) => {
                warn!(editor = %self.editor.id(), error = %e, "Copy extraction failed");
                return false;
            }
        };
        self.bridge.write(&text).await
    }

    /// Cut = extract + bridge write + one model deletion. Empty selections
    /// are a no-op; the deletion is skipped if the clipboard never got the
    /// text, so nothing is lost.
    pub async fn cut(&self) -> bool {
        let selection = match self.editor.selection() {
            Ok(sel) => sel,
            Err(e) => {
                warn!(editor = %self.editor.id(), error = %e, "Cut could not read selection");
                return false;
            }
        };
        if selection.is_empty() {
            trace!(editor = %self.editor.id(), "Cut with empty selection is a no-op");
            return false;
        }
        let model = match self.editor.model() {
            Ok(model) => model,
            Err(e) => {
                warn!(editor = %self.editor.id(), error = %e, "Cut could not reach the model");
                return false;
            }
        };
        let lines = match model_lines(&model) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(editor = %self.editor.id(), error = %e, "Cut could not read lines");
                return false;
            }
        };
        let text = extract_text(&lines, &selection);
        if !self.bridge.write(&text).await {
            warn!(editor = %self.editor.id(), "Cut aborted: clipboard write failed");
            return false;
        }
        match model.apply_edit(selection, "") {
            Ok(()) => {
                let _ = self
                    .editor
                    .set_selection(SelectionRange::caret(selection.start()));
                true
            }
            Err(e) => {
                warn!(editor = %self.editor.id(), error = %e, "Cut deletion failed");
                false
            }
        }
    }

    /// Read from the bridge and insert the raw text in a single model edit,
    /// with the widget's formatting options disabled for the duration and
    /// restored after the configured delay.
    pub async fn paste(&self) -> bool {
        let text = self.bridge.read().await;
        if text.is_empty() {
            trace!(editor = %self.editor.id(), "Paste skipped: clipboard empty");
            return false;
        }

        let saved = self.editor.options();
        if let Err(e) = self.editor.update_options(&EditorOptionsPatch::paste_guard()) {
            warn!(editor = %self.editor.id(), error = %e, "Could not disable formatting options");
        }

        let result = self.insert_raw(&text);

        // Keep the guard up past the widget's deferred post-processing
        // window before putting the user's options back.
        tokio::time::sleep(Duration::from_millis(self.config.option_restore_delay_ms)).await;
        if let Err(e) = self
            .editor
            .update_options(&EditorOptionsPatch::restore_formatting(&saved))
        {
            warn!(editor = %self.editor.id(), error = %e, "Could not restore formatting options");
        }

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(editor = %self.editor.id(), error = %e, "Paste edit failed");
                false
            }
        }
    }

    fn extract_for_copy(&self) -> Result<String, OverrideError> {
        let selection = self.editor.selection()?;
        let lines = match self.editor.model().and_then(|m| model_lines(&m)) {
            Ok(lines) => lines,
            Err(e) => {
                debug!(editor = %self.editor.id(), error = %e, "Model access failed, reading rendered lines");
                self.editor.rendered_lines()?
            }
        };
        Ok(if selection.is_empty() {
            lines.join("\n")
        } else {
            extract_text(&lines, &selection)
        })
    }

    fn insert_raw(&self, text: &str) -> Result<(), OverrideError> {
        let selection = self.editor.selection()?;
        let model = self.editor.model()?;
        model.apply_edit(selection, text)?;
        let caret = paste_caret(selection.start(), text);
        self.editor.set_selection(SelectionRange::caret(caret))?;
        debug!(editor = %self.editor.id(), chars = text.chars().count(), %caret, "Raw paste applied");
        Ok(())
    }
}

#[async_trait]
impl KeyInterceptor for EditorOverride {
    async fn on_key(&self, ev: KeyEvent) -> KeyDisposition {
        let Some(action) = classify_chord(self.platform, &ev) else {
            return KeyDisposition::Pass;
        };
        match action {
            EditorAction::SelectAll => {
                if let Err(e) = self.select_all() {
                    warn!(editor = %self.editor.id(), error = %e, "Select-all failed");
                }
            }
            EditorAction::Copy => {
                self.copy().await;
            }
            EditorAction::Cut => {
                self.cut().await;
            }
            EditorAction::Paste => {
                self.paste().await;
            }
        }
        KeyDisposition::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn chord_classification() {
        let p = Platform::Other;
        assert_eq!(
            classify_chord(p, &KeyEvent::command(p, KeyCode::KeyA)),
            Some(EditorAction::SelectAll)
        );
        assert_eq!(
            classify_chord(p, &KeyEvent::command(p, KeyCode::KeyC)),
            Some(EditorAction::Copy)
        );
        assert_eq!(
            classify_chord(p, &KeyEvent::command(p, KeyCode::KeyX)),
            Some(EditorAction::Cut)
        );
        assert_eq!(
            classify_chord(p, &KeyEvent::command(p, KeyCode::KeyV)),
            Some(EditorAction::Paste)
        );
        // Wrong modifier for the platform.
        assert_eq!(
            classify_chord(Platform::MacOs, &KeyEvent::command(p, KeyCode::KeyC)),
            None
        );
        // No modifier at all.
        assert_eq!(classify_chord(p, &KeyEvent::plain(KeyCode::KeyC)), None);
    }

    #[test]
    fn full_range_covers_the_document() {
        let range = full_document_range(&lines(&["alpha", "", "gamma!"]));
        assert_eq!(range.start(), Position::new(1, 1));
        assert_eq!(range.end(), Position::new(3, 7));
    }

    #[test]
    fn full_range_of_single_empty_line() {
        let range = full_document_range(&lines(&[""]));
        assert_eq!(range.start(), Position::new(1, 1));
        assert_eq!(range.end(), Position::new(1, 1));
    }

    #[test]
    fn single_line_extraction_is_column_bounded() {
        let doc = lines(&["let answer = 42;"]);
        let range = SelectionRange::new(Position::new(1, 5), Position::new(1, 11));
        assert_eq!(extract_text(&doc, &range), "answer");
    }

    #[test]
    fn multi_line_extraction_concatenates_suffix_interior_prefix() {
        let doc = lines(&["fn main() {", "    body();", "}"]);
        let range = SelectionRange::new(Position::new(1, 4), Position::new(3, 2));
        assert_eq!(extract_text(&doc, &range), "main() {\n    body();\n}");
    }

    #[test]
    fn extraction_handles_zero_length_interior_lines() {
        let doc = lines(&["one", "", "three"]);
        let range = SelectionRange::new(Position::new(1, 2), Position::new(3, 3));
        assert_eq!(extract_text(&doc, &range), "ne\n\nth");
    }

    #[test]
    fn extraction_counts_chars_not_bytes() {
        let doc = lines(&["héllo wörld"]);
        let range = SelectionRange::new(Position::new(1, 2), Position::new(1, 6));
        assert_eq!(extract_text(&doc, &range), "éllo");
    }

    #[test]
    fn paste_caret_without_line_breaks_advances_the_column() {
        let caret = paste_caret(Position::new(2, 5), "abc");
        assert_eq!(caret, Position::new(2, 8));
    }

    #[test]
    fn paste_caret_with_line_breaks_lands_on_the_last_segment() {
        let caret = paste_caret(Position::new(2, 5), "one\ntwo\nthree");
        assert_eq!(caret, Position::new(4, 6));
    }

    #[test]
    fn paste_caret_after_trailing_newline() {
        let caret = paste_caret(Position::new(1, 1), "line\n");
        assert_eq!(caret, Position::new(2, 1));
    }
}
