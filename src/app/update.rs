use tracing::{debug, warn};

use crate::app::{Model, ToastLevel};
use crate::editor::{Direction, EditorBuffer};
use crate::suggest::{SessionEvent, SuggestError, TransformKind};

use super::model::PersonalizePreview;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Split line at cursor (Enter)
    SplitLine,
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,

    // Cursor
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    /// Move cursor to start of buffer (Ctrl+Home)
    MoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    MoveToEnd,
    PageUp,
    PageDown,

    // Suggestions
    /// Ask for a suggestion (Ctrl+Space)
    RequestSuggestion,
    /// Typing pause elapsed with auto-suggest on
    AutoSuggest,
    AcceptSuggestion,
    RejectSuggestion,
    /// A background request finished
    Generation(SessionEvent),

    // Personalization
    Personalize(TransformKind),
    /// Replace the draft with the previewed content
    ApplyPreview,
    DismissPreview,

    // Window
    ToggleHelp,
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message can change document content.
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::SplitLine
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::AcceptSuggestion
                | Self::ApplyPreview
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Starting
/// background requests is left to the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::InsertChar(ch) => edit(&mut model, |buf| buf.insert_char(ch)),
        Message::SplitLine => edit(&mut model, EditorBuffer::split_line),
        Message::DeleteBack => edit(&mut model, EditorBuffer::delete_back),
        Message::DeleteForward => edit(&mut model, EditorBuffer::delete_forward),

        Message::MoveCursor(dir) => navigate(&mut model, |buf| buf.move_cursor(dir)),
        Message::MoveHome => navigate(&mut model, EditorBuffer::move_home),
        Message::MoveEnd => navigate(&mut model, EditorBuffer::move_end),
        Message::MoveToStart => navigate(&mut model, EditorBuffer::move_to_start),
        Message::MoveToEnd => navigate(&mut model, EditorBuffer::move_to_end),
        Message::PageUp | Message::PageDown => {
            let dir = if msg == Message::PageUp {
                Direction::Up
            } else {
                Direction::Down
            };
            let rows = model.editor_rows().max(1);
            navigate(&mut model, |buf| {
                for _ in 0..rows {
                    buf.move_cursor(dir);
                }
            });
        }

        // Issued by the side-effect handler.
        Message::RequestSuggestion | Message::AutoSuggest | Message::Personalize(_) => {}

        Message::AcceptSuggestion => {
            match model.session.on_accept_suggestion() {
                Ok(()) => model.ensure_cursor_visible(),
                Err(err) => report_contract_error(&mut model, &err),
            }
        }
        Message::RejectSuggestion => {
            if let Err(err) = model.session.on_reject_suggestion() {
                report_contract_error(&mut model, &err);
            }
        }
        Message::Generation(event) => apply_session_event(&mut model, event),

        Message::ApplyPreview => {
            if let Some(preview) = model.preview.take() {
                model.session.on_content_change(&preview.content);
                model.session.navigate(EditorBuffer::move_to_end);
                model.ensure_cursor_visible();
                model.show_toast(ToastLevel::Info, format!("Applied: {}", preview.kind.label()));
            }
        }
        Message::DismissPreview => {
            model.preview = None;
        }

        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.ensure_cursor_visible();
        }
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}

fn edit<F>(model: &mut Model, apply: F)
where
    F: FnOnce(&mut EditorBuffer) -> bool,
{
    if model.session.edit(apply) {
        model.ensure_cursor_visible();
    }
}

fn navigate<F>(model: &mut Model, apply: F)
where
    F: FnOnce(&mut EditorBuffer),
{
    model.session.navigate(apply);
    model.ensure_cursor_visible();
}

fn report_contract_error(model: &mut Model, err: &SuggestError) {
    warn!(%err, "suggestion key ignored");
    model.show_toast(ToastLevel::Warning, err.to_string());
}

fn apply_session_event(model: &mut Model, event: SessionEvent) {
    match event {
        SessionEvent::SuggestionShown => {}
        SessionEvent::SuggestionStale => {
            debug!("stale suggestion discarded");
        }
        SessionEvent::NoSuggestion => {
            model.show_toast(ToastLevel::Info, "No suggestion available");
        }
        SessionEvent::GenerationFailed(message) => {
            model.show_toast(
                ToastLevel::Warning,
                format!("No suggestion available ({message})"),
            );
        }
        SessionEvent::Personalized { kind, content } => {
            model.preview = Some(PersonalizePreview { kind, content });
        }
        SessionEvent::PersonalizeFailed { kind, message } => {
            model.show_toast(
                ToastLevel::Error,
                format!("{} failed: {message}", kind.label()),
            );
        }
    }
}
