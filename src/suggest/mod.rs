//! Inline AI suggestions.
//!
//! A [`SuggestionSession`] owns the document and a [`SuggestionStore`]. The
//! store is the single source of truth for whether a suggestion is idle,
//! generating or visible; the document only changes through the content
//! synchronizer, so ghost text can never leak into it.

pub mod error;
pub mod generate;
pub mod keys;
pub mod overlay;
pub mod personalize;
pub mod session;
pub mod store;
pub mod sync;

pub use error::{GenerationError, Operation, Phase, SuggestError};
pub use generate::{
    GenerationService, HeuristicGenerator, HttpGenerator, PendingRequest,
    PersonalizeRequest, PersonalizeResponse, SuggestRequest, SuggestResponse,
};
pub use keys::{KeyBindings, KeyError, KeyIdentifier, SuggestionIntent};
pub use overlay::{CursorAnchor, DecorationSurface, Overlay, OverlayStyle, AI_BADGE};
pub use personalize::{PersonalizationDispatcher, TransformKind};
pub use session::{SessionEvent, SuggestionSession};
pub use store::{Received, RequestTicket, Suggestion, SuggestionState, SuggestionStore};
pub use sync::ContentSynchronizer;
