//! The embedding surface: one editing session wired to a generation service.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::editor::EditorBuffer;

use super::error::{GenerationError, Phase, SuggestError};
use super::generate::{
    GenerationService, PendingRequest, PersonalizeResponse, SuggestRequest, SuggestResponse,
};
use super::keys::SuggestionIntent;
use super::overlay::{self, CursorAnchor, DecorationSurface, Overlay};
use super::personalize::{PersonalizationDispatcher, TransformKind};
use super::store::{Received, RequestTicket, SuggestionState, SuggestionStore};
use super::sync::ContentSynchronizer;

/// Something that happened to an in-flight request since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SuggestionShown,
    /// The content moved on while generating; the result was dropped.
    SuggestionStale,
    /// The service answered with nothing usable.
    NoSuggestion,
    GenerationFailed(String),
    Personalized {
        kind: TransformKind,
        content: String,
    },
    PersonalizeFailed {
        kind: TransformKind,
        message: String,
    },
}

/// Document, suggestion lifecycle and outstanding requests for one editor.
pub struct SuggestionSession {
    store: SuggestionStore,
    sync: ContentSynchronizer,
    generator: Arc<dyn GenerationService>,
    personalizer: PersonalizationDispatcher,
    in_flight: Option<(RequestTicket, PendingRequest<SuggestResponse>)>,
    personalizing: Option<(TransformKind, PendingRequest<PersonalizeResponse>)>,
    anchor: CursorAnchor,
}

impl SuggestionSession {
    pub fn new(text: &str, generator: Arc<dyn GenerationService>) -> Self {
        let sync = ContentSynchronizer::new(text);
        let anchor = CursorAnchor::for_document(sync.buffer());
        Self {
            store: SuggestionStore::new(),
            sync,
            personalizer: PersonalizationDispatcher::new(Arc::clone(&generator)),
            generator,
            in_flight: None,
            personalizing: None,
            anchor,
        }
    }

    pub const fn state(&self) -> &SuggestionState {
        self.store.state()
    }

    pub const fn phase(&self) -> Phase {
        self.store.phase()
    }

    pub fn current_text(&self) -> String {
        self.sync.current_text()
    }

    pub const fn document(&self) -> &EditorBuffer {
        self.sync.buffer()
    }

    /// The personalization currently running, if any.
    pub fn personalizing(&self) -> Option<TransformKind> {
        self.personalizing.as_ref().map(|(kind, _)| *kind)
    }

    /// Replace the whole document. Cancels any suggestion first.
    pub fn on_content_change(&mut self, text: &str) -> bool {
        self.in_flight = None;
        let changed = self.sync.on_change(text, &mut self.store);
        self.refresh_anchor();
        changed
    }

    /// Apply a keystroke edit. Only a real content change cancels.
    pub fn edit<F>(&mut self, apply: F) -> bool
    where
        F: FnOnce(&mut EditorBuffer) -> bool,
    {
        let changed = self.sync.edit(&mut self.store, apply);
        if changed {
            self.in_flight = None;
            self.refresh_anchor();
        }
        changed
    }

    pub fn navigate<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut EditorBuffer),
    {
        self.sync.navigate(apply);
    }

    /// Ask the generation service for a continuation of the current draft.
    ///
    /// # Errors
    ///
    /// Fails unless the suggestion is idle.
    pub fn request_suggestion(&mut self) -> Result<RequestTicket, SuggestError> {
        let ticket = self.store.request_suggestion(self.sync.content_len())?;
        let request = SuggestRequest {
            current_text: self.sync.current_text(),
        };
        let generator = Arc::clone(&self.generator);
        self.in_flight = Some((
            ticket,
            PendingRequest::spawn(move || generator.suggest(&request)),
        ));
        info!(?ticket, chars = self.sync.content_len(), "suggestion requested");
        Ok(ticket)
    }

    /// Collect results of finished requests without blocking.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        let finished = self
            .in_flight
            .as_mut()
            .and_then(|(ticket, pending)| pending.try_take().map(|result| (*ticket, result)));
        if let Some((ticket, result)) = finished {
            self.in_flight = None;
            events.push(self.settle_suggestion(ticket, result));
        }

        let finished = self
            .personalizing
            .as_mut()
            .and_then(|(kind, pending)| pending.try_take().map(|result| (*kind, result)));
        if let Some((kind, result)) = finished {
            self.personalizing = None;
            events.push(settle_personalization(kind, result));
        }

        events
    }

    /// Block up to `timeout` for the in-flight suggestion.
    pub fn wait_for_suggestion(&mut self, timeout: Duration) -> Option<SessionEvent> {
        let (ticket, mut pending) = self.in_flight.take()?;
        match pending.wait_timeout(timeout) {
            Some(result) => Some(self.settle_suggestion(ticket, result)),
            None => {
                self.in_flight = Some((ticket, pending));
                None
            }
        }
    }

    /// Block up to `timeout` for the in-flight personalization.
    pub fn wait_for_personalization(&mut self, timeout: Duration) -> Option<SessionEvent> {
        let (kind, mut pending) = self.personalizing.take()?;
        match pending.wait_timeout(timeout) {
            Some(result) => Some(settle_personalization(kind, result)),
            None => {
                self.personalizing = Some((kind, pending));
                None
            }
        }
    }

    fn settle_suggestion(
        &mut self,
        ticket: RequestTicket,
        result: Result<SuggestResponse, GenerationError>,
    ) -> SessionEvent {
        match result {
            Ok(response) => match self.store.receive_suggestion(
                ticket,
                &response.suggestion_text,
                self.sync.content_len(),
            ) {
                Received::Shown => {
                    self.refresh_anchor();
                    SessionEvent::SuggestionShown
                }
                Received::Stale => SessionEvent::SuggestionStale,
                Received::Empty => SessionEvent::NoSuggestion,
            },
            Err(err) => {
                warn!(%err, ?ticket, "suggestion generation failed");
                self.store.fail(ticket);
                SessionEvent::GenerationFailed(err.to_string())
            }
        }
    }

    /// Merge the visible suggestion into the document.
    ///
    /// # Errors
    ///
    /// Fails unless a suggestion is visible.
    pub fn on_accept_suggestion(&mut self) -> Result<(), SuggestError> {
        let text = self.store.accept()?;
        self.sync.merge_suggestion(&text);
        self.refresh_anchor();
        Ok(())
    }

    /// Discard the visible suggestion.
    ///
    /// # Errors
    ///
    /// Fails unless a suggestion is visible.
    pub fn on_reject_suggestion(&mut self) -> Result<(), SuggestError> {
        self.store.reject()
    }

    /// Carry out a dispatched key intent.
    ///
    /// # Errors
    ///
    /// Fails unless a suggestion is visible.
    pub fn apply_intent(&mut self, intent: SuggestionIntent) -> Result<(), SuggestError> {
        match intent {
            SuggestionIntent::Accept => self.on_accept_suggestion(),
            SuggestionIntent::Reject => self.on_reject_suggestion(),
        }
    }

    /// Start a content transform. A running one is superseded.
    pub fn on_personalize_content(&mut self, kind: TransformKind) {
        if let Some((previous, _)) = &self.personalizing {
            debug!(%previous, next = %kind, "personalization superseded");
        }
        let pending = self.personalizer.dispatch(kind, self.sync.current_text());
        self.personalizing = Some((kind, pending));
    }

    /// What to draw for the current state.
    pub fn overlay(&self) -> Option<Overlay> {
        overlay::render(self.sync.buffer(), self.anchor, self.store.state())
    }

    /// Hand the current overlay, if any, to `surface`.
    pub fn paint<S: DecorationSurface>(&self, surface: &mut S) -> bool {
        overlay::paint(surface, self.sync.buffer(), self.anchor, self.store.state())
    }

    /// Tear down: abort outstanding requests and clear the suggestion.
    pub fn unmount(&mut self) {
        self.in_flight = None;
        self.personalizing = None;
        if self.store.cancel() {
            debug!("suggestion cleared on unmount");
        }
    }

    /// Same-length edits can still move line breaks, so always recompute.
    fn refresh_anchor(&mut self) {
        self.anchor = CursorAnchor::for_document(self.sync.buffer());
    }
}

fn settle_personalization(
    kind: TransformKind,
    result: Result<PersonalizeResponse, GenerationError>,
) -> SessionEvent {
    match result {
        Ok(response) => {
            info!(action = %kind, "personalization ready");
            SessionEvent::Personalized {
                kind,
                content: response.content,
            }
        }
        Err(err) => {
            warn!(action = %kind, %err, "personalization failed");
            SessionEvent::PersonalizeFailed {
                kind,
                message: err.to_string(),
            }
        }
    }
}

impl std::fmt::Debug for SuggestionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionSession")
            .field("state", self.store.state())
            .field("chars", &self.sync.content_len())
            .field("generating", &self.in_flight.is_some())
            .field("personalizing", &self.personalizing())
            .finish_non_exhaustive()
    }
}
