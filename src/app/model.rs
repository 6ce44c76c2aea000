use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::suggest::{HeuristicGenerator, KeyBindings, SuggestionSession, TransformKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Transformed content waiting for the author to apply or discard it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalizePreview {
    pub kind: TransformKind,
    pub content: String,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Document, suggestion lifecycle and in-flight requests
    pub session: SuggestionSession,
    /// Accept / reject keys
    pub keys: KeyBindings,
    /// File the draft was loaded from, if any
    pub file_path: Option<PathBuf>,
    /// Terminal size (width, height)
    pub terminal_size: (u16, u16),
    /// First document line shown in the editor pane
    pub scroll_offset: usize,
    /// Request suggestions automatically after a typing pause
    pub auto_suggest: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Personalization result awaiting Enter / Esc
    pub preview: Option<PersonalizePreview>,
    toast: Option<Toast>,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("session", &self.session)
            .field("help_visible", &self.help_visible)
            .field("preview", &self.preview.as_ref().map(|p| p.kind))
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(session: SuggestionSession, terminal_size: (u16, u16)) -> Self {
        Self {
            session,
            keys: KeyBindings::default(),
            file_path: None,
            terminal_size,
            scroll_offset: 0,
            auto_suggest: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            preview: None,
            toast: None,
            should_quit: false,
        }
    }

    /// Rows available to the editor pane.
    pub fn editor_rows(&self) -> usize {
        let footer = 1 + u16::from(self.toast.is_some());
        usize::from(self.terminal_size.1.saturating_sub(footer))
    }

    /// Scroll so the cursor line is on screen.
    pub(super) fn ensure_cursor_visible(&mut self) {
        let cursor_line = self.session.document().cursor().line;
        let rows = self.editor_rows();
        if rows == 0 {
            self.scroll_offset = cursor_line;
        } else if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + rows {
            self.scroll_offset = cursor_line + 1 - rows;
        }
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Name shown in the status bar.
    pub fn display_name(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map_or_else(
                || "untitled".to_string(),
                |s| s.to_string_lossy().to_string(),
            )
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new(
            SuggestionSession::new("", Arc::new(HeuristicGenerator)),
            (80, 24),
        )
    }
}
