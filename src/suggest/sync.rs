use tracing::debug;

use crate::editor::EditorBuffer;

use super::store::SuggestionStore;

/// Owner of the canonical document.
///
/// Every content mutation goes through here. Anything other than a merge
/// cancels whatever the suggestion store is doing.
#[derive(Debug, Default)]
pub struct ContentSynchronizer {
    buffer: EditorBuffer,
}

impl ContentSynchronizer {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: EditorBuffer::from_text(text),
        }
    }

    pub fn current_text(&self) -> String {
        self.buffer.text()
    }

    pub fn content_len(&self) -> usize {
        self.buffer.len_chars()
    }

    pub const fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    /// Replace the document with `text` as reported by the editing surface.
    ///
    /// Any generating or visible suggestion is cancelled first, even if the
    /// text turns out to be identical.
    pub fn on_change(&mut self, text: &str, store: &mut SuggestionStore) -> bool {
        store.cancel();
        let changed = self.buffer.set_text(text);
        if changed {
            debug!(chars = self.buffer.len_chars(), "content replaced");
        }
        changed
    }

    /// Apply a single keystroke edit to the document.
    ///
    /// `apply` returns whether it changed the content. Cursor-only moves
    /// report `false` and leave the suggestion alone. A real edit cancels it
    /// before this returns.
    pub fn edit<F>(&mut self, store: &mut SuggestionStore, apply: F) -> bool
    where
        F: FnOnce(&mut EditorBuffer) -> bool,
    {
        let before = self.buffer.len_chars();
        if !apply(&mut self.buffer) {
            return false;
        }
        let cancelled = store.cancel();
        debug!(before, after = self.buffer.len_chars(), cancelled, "content edited");
        true
    }

    /// Move the cursor without touching content.
    pub fn navigate<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut EditorBuffer),
    {
        apply(&mut self.buffer);
    }

    /// Append an accepted suggestion after a single separating space.
    ///
    /// Leading whitespace of the suggestion is dropped so the join is exactly
    /// one space. The append is a single rope insertion.
    pub fn merge_suggestion(&mut self, text: &str) {
        let merged = merge_text(text);
        self.buffer.append(&merged);
        debug!(chars = merged.chars().count(), "suggestion merged");
    }
}

/// Text that [`ContentSynchronizer::merge_suggestion`] appends for `suggestion`.
pub fn merge_text(suggestion: &str) -> String {
    format!(" {}", suggestion.trim_start())
}
