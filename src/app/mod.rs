//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, PersonalizePreview, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DEFAULT_IDLE_MS;
use crate::editor::EditorBuffer;
use crate::suggest::{GenerationService, HeuristicGenerator, KeyBindings, SuggestionSession};

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    initial_text: String,
    file_path: Option<PathBuf>,
    generator: Arc<dyn GenerationService>,
    keys: KeyBindings,
    auto_suggest: bool,
    idle_ms: u64,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an editor for `initial_text`, suggesting offline by default.
    pub fn new(initial_text: impl Into<String>) -> Self {
        Self {
            initial_text: initial_text.into(),
            file_path: None,
            generator: Arc::new(HeuristicGenerator),
            keys: KeyBindings::default(),
            auto_suggest: false,
            idle_ms: DEFAULT_IDLE_MS,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Remember where the draft came from (shown in the status bar).
    pub fn with_file_path(mut self, path: Option<PathBuf>) -> Self {
        self.file_path = path;
        self
    }

    /// Use `generator` for suggestions and personalization.
    pub fn with_generator(mut self, generator: Arc<dyn GenerationService>) -> Self {
        self.generator = generator;
        self
    }

    pub const fn with_key_bindings(mut self, keys: KeyBindings) -> Self {
        self.keys = keys;
        self
    }

    /// Request suggestions after `idle_ms` without edits.
    pub const fn with_auto_suggest(mut self, enabled: bool, idle_ms: u64) -> Self {
        self.auto_suggest = enabled;
        self.idle_ms = idle_ms;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    fn into_model(self, terminal_size: (u16, u16)) -> Model {
        let session = SuggestionSession::new(&self.initial_text, self.generator);
        let mut model = Model::new(session, terminal_size);
        model.keys = self.keys;
        model.file_path = self.file_path;
        model.auto_suggest = self.auto_suggest;
        model.config_global_path = self.config_global_path;
        model.config_local_path = self.config_local_path;
        // Drafts are continued, so start at the end.
        model.session.navigate(EditorBuffer::move_to_end);
        model.ensure_cursor_visible();
        model
    }
}
