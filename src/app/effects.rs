use tracing::{debug, warn};

use crate::app::{App, Message, Model, ToastLevel};
use crate::suggest::Phase;

impl App {
    /// Work that can't happen inside `update`: starting and tearing down
    /// background generation.
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        match msg {
            Message::RequestSuggestion => {
                if let Err(err) = model.session.request_suggestion() {
                    warn!(%err, "suggestion request refused");
                    model.show_toast(ToastLevel::Warning, err.to_string());
                }
            }
            Message::AutoSuggest => {
                if model.session.phase() != Phase::Idle
                    || model.preview.is_some()
                    || model.session.document().is_blank()
                {
                    return;
                }
                if let Err(err) = model.session.request_suggestion() {
                    debug!(%err, "auto-suggest skipped");
                }
            }
            Message::Personalize(kind) => {
                model.session.on_personalize_content(*kind);
                model.show_toast(ToastLevel::Info, format!("{}\u{2026}", kind.label()));
            }
            Message::Quit => {
                model.session.unmount();
            }
            _ => {}
        }
    }
}
