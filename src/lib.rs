// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. suggest::SuggestionStore)
    clippy::module_name_repetitions
)]

//! # Inkling
//!
//! A terminal draft editor with inline AI suggestions.
//!
//! Suggestions are drawn as ghost text after the draft and merged only when
//! the author accepts them (Tab by default). Rejecting (Esc) or simply
//! continuing to type discards them; ghost text never enters the document.
//!
//! ## Architecture
//!
//! The editor uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`suggest`]: Suggestion lifecycle, generation contract, key dispatch
//! - [`editor`]: Rope-backed draft buffer
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved defaults and flag parsing

pub mod app;
pub mod config;
pub mod editor;
pub mod suggest;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::EditorBuffer;
    pub use crate::suggest::{SessionEvent, SuggestionSession, SuggestionState};
}
