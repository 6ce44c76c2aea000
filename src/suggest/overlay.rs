//! Ghost-text decoration.
//!
//! [`render`] describes *where* and *what* to draw for a visible suggestion;
//! a [`DecorationSurface`] decides *how*. Nothing here touches the document.

use tracing::trace;

use crate::editor::EditorBuffer;

use super::store::SuggestionState;
use super::sync::merge_text;

/// Marker drawn next to ghost text so it can't be mistaken for real content.
pub const AI_BADGE: &str = "AI";

/// Document position at which ghost text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorAnchor {
    pub line: usize,
    /// Char column within `line`.
    pub column: usize,
    /// Absolute char offset into the document.
    pub char_offset: usize,
}

impl CursorAnchor {
    /// Anchor at the merge point, i.e. the end of the document.
    pub fn for_document(document: &EditorBuffer) -> Self {
        let char_offset = document.len_chars();
        let (line, column) = document.position_of_char(char_offset);
        Self {
            line,
            column,
            char_offset,
        }
    }

    /// Keep this anchor while its offset still matches the document length,
    /// otherwise recompute it from `document`.
    ///
    /// Callers that restructure lines without changing the length must
    /// refresh the anchor themselves.
    pub fn resolve(self, document: &EditorBuffer) -> Self {
        if self.char_offset == document.len_chars() {
            return self;
        }
        let fresh = Self::for_document(document);
        trace!(stale = ?self, ?fresh, "overlay anchor recomputed");
        fresh
    }
}

/// How ghost text should be styled by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
    /// A not-yet-accepted proposal.
    Proposal,
}

/// Visual description of a visible suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub anchor: CursorAnchor,
    /// Exactly what accepting would append, separator included.
    pub text: String,
    pub style: OverlayStyle,
    pub badge: &'static str,
}

impl Overlay {
    /// Text that continues the anchor line.
    pub fn inline_text(&self) -> &str {
        self.text.split('\n').next().unwrap_or_default()
    }

    /// Ghost lines that would follow the anchor line.
    pub fn trailing_lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n').skip(1)
    }
}

/// An editing surface able to draw an [`Overlay`].
pub trait DecorationSurface {
    fn draw_overlay(&mut self, overlay: &Overlay);
}

/// Compute the overlay for `state`, if any.
///
/// Returns `None` unless a suggestion is visible.
pub fn render(
    document: &EditorBuffer,
    anchor: CursorAnchor,
    state: &SuggestionState,
) -> Option<Overlay> {
    let suggestion = state.suggestion()?;
    Some(Overlay {
        anchor: anchor.resolve(document),
        text: merge_text(&suggestion.text),
        style: OverlayStyle::Proposal,
        badge: AI_BADGE,
    })
}

/// Compute the overlay and hand it to `surface`. Returns whether anything was drawn.
pub fn paint<S: DecorationSurface>(
    surface: &mut S,
    document: &EditorBuffer,
    anchor: CursorAnchor,
    state: &SuggestionState,
) -> bool {
    match render(document, anchor, state) {
        Some(overlay) => {
            surface.draw_overlay(&overlay);
            true
        }
        None => false,
    }
}
