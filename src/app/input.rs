use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::suggest::{SuggestionIntent, TransformKind};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if model.preview.is_some() {
            return match key.code {
                KeyCode::Enter => Some(Message::ApplyPreview),
                KeyCode::Esc => Some(Message::DismissPreview),
                _ => None,
            };
        }

        // Accept / reject win over editing, but only while a suggestion shows.
        if let Some(intent) = model.keys.dispatch(&key, model.session.state()) {
            return Some(match intent {
                SuggestionIntent::Accept => Message::AcceptSuggestion,
                SuggestionIntent::Reject => Message::RejectSuggestion,
            });
        }

        // Without a visible suggestion the bound keys do nothing at all.
        if model.keys.is_bound(&key) {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char(' ') if ctrl => Some(Message::RequestSuggestion),
            // Some terminals report Ctrl+Space as NUL.
            KeyCode::Null => Some(Message::RequestSuggestion),
            KeyCode::Char(c) if alt && c.is_ascii_digit() => {
                TransformKind::from_index(c as usize - '0' as usize).map(Message::Personalize)
            }
            KeyCode::F(1) => Some(Message::ToggleHelp),

            KeyCode::Home if ctrl => Some(Message::MoveToStart),
            KeyCode::End if ctrl => Some(Message::MoveToEnd),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),

            KeyCode::Enter => Some(Message::SplitLine),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Char(c) if !ctrl && !alt => Some(Message::InsertChar(c)),

            _ => None,
        }
    }
}
