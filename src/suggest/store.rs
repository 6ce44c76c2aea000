use tracing::debug;

use super::error::{Operation, Phase, SuggestError};

/// Identifies one generation request so its response can be routed back.
///
/// Tickets only distinguish requests from each other; staleness is decided
/// by comparing content lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// A proposed continuation, not part of the document until accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub requested_at_content_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuggestionState {
    #[default]
    Idle,
    Generating {
        ticket: RequestTicket,
        requested_at_content_length: usize,
    },
    Visible(Suggestion),
}

impl SuggestionState {
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Generating { .. } => Phase::Generating,
            Self::Visible(_) => Phase::Visible,
        }
    }

    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }

    pub const fn suggestion(&self) -> Option<&Suggestion> {
        match self {
            Self::Visible(suggestion) => Some(suggestion),
            _ => None,
        }
    }
}

/// What happened to a generation response handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// The suggestion is now visible.
    Shown,
    /// The response was computed against content that no longer exists.
    Stale,
    /// The service had nothing to offer.
    Empty,
}

/// Suggestion lifecycle for one editor session.
///
/// `Idle -> Generating -> Visible -> Idle`, with `Generating -> Idle` on
/// failure, staleness or cancellation. `Visible -> Generating` is not
/// allowed; the visible suggestion must be accepted, rejected or cancelled
/// first.
#[derive(Debug, Default)]
pub struct SuggestionStore {
    state: SuggestionState,
    next_ticket: u64,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Start a generation against a document of `content_len` chars.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestError::InvalidTransition`] unless the store is idle.
    pub fn request_suggestion(
        &mut self,
        content_len: usize,
    ) -> Result<RequestTicket, SuggestError> {
        if !matches!(self.state, SuggestionState::Idle) {
            return Err(self.invalid(Operation::RequestSuggestion));
        }
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        self.state = SuggestionState::Generating {
            ticket,
            requested_at_content_length: content_len,
        };
        debug!(?ticket, content_len, "suggestion requested");
        Ok(ticket)
    }

    /// Hand a generation result to the store.
    ///
    /// The result is shown only if it answers the request currently in
    /// flight and the document length is unchanged since that request.
    /// Anything else is discarded without error.
    pub fn receive_suggestion(
        &mut self,
        ticket: RequestTicket,
        text: &str,
        current_content_len: usize,
    ) -> Received {
        let SuggestionState::Generating {
            ticket: pending,
            requested_at_content_length,
        } = self.state
        else {
            debug!(?ticket, phase = %self.phase(), "late suggestion discarded");
            return Received::Stale;
        };
        if pending != ticket {
            debug!(?ticket, ?pending, "suggestion for superseded request discarded");
            return Received::Stale;
        }

        if requested_at_content_length != current_content_len {
            debug!(
                requested_at_content_length,
                current_content_len, "stale suggestion discarded"
            );
            self.state = SuggestionState::Idle;
            return Received::Stale;
        }
        if text.trim().is_empty() {
            debug!(?ticket, "generation produced no text");
            self.state = SuggestionState::Idle;
            return Received::Empty;
        }

        self.state = SuggestionState::Visible(Suggestion {
            text: text.to_string(),
            requested_at_content_length,
        });
        debug!(?ticket, chars = text.chars().count(), "suggestion visible");
        Received::Shown
    }

    /// Record a failed generation. Ignored unless `ticket` is in flight.
    pub fn fail(&mut self, ticket: RequestTicket) -> bool {
        match self.state {
            SuggestionState::Generating { ticket: pending, .. } if pending == ticket => {
                self.state = SuggestionState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Take the visible suggestion's text for merging.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestError::InvalidTransition`] unless a suggestion is visible.
    pub fn accept(&mut self) -> Result<String, SuggestError> {
        match std::mem::take(&mut self.state) {
            SuggestionState::Visible(suggestion) => {
                debug!("suggestion accepted");
                Ok(suggestion.text)
            }
            other => {
                self.state = other;
                Err(self.invalid(Operation::Accept))
            }
        }
    }

    /// Drop the visible suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestError::InvalidTransition`] unless a suggestion is visible.
    pub fn reject(&mut self) -> Result<(), SuggestError> {
        if !self.state.is_visible() {
            return Err(self.invalid(Operation::Reject));
        }
        self.state = SuggestionState::Idle;
        debug!("suggestion rejected");
        Ok(())
    }

    /// Force the store back to idle from any state.
    ///
    /// Returns `true` if a generation or a visible suggestion was dropped.
    pub fn cancel(&mut self) -> bool {
        let was_active = !matches!(self.state, SuggestionState::Idle);
        if was_active {
            debug!(phase = %self.phase(), "suggestion cancelled");
        }
        self.state = SuggestionState::Idle;
        was_active
    }

    const fn invalid(&self, operation: Operation) -> SuggestError {
        SuggestError::InvalidTransition {
            operation,
            state: self.state.phase(),
        }
    }
}
