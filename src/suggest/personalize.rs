use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::generate::{GenerationService, PendingRequest, PersonalizeRequest, PersonalizeResponse};

/// Content transforms the author can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Expand,
    Improve,
    Seo,
    Suggest,
}

impl TransformKind {
    pub const ALL: [Self; 4] = [Self::Expand, Self::Improve, Self::Seo, Self::Suggest];

    /// Wire name, as sent to the generation service.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expand => "expand",
            Self::Improve => "improve",
            Self::Seo => "seo",
            Self::Suggest => "suggest",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Expand => "Expand",
            Self::Improve => "Improve",
            Self::Seo => "Optimize for SEO",
            Self::Suggest => "Suggest ideas",
        }
    }

    /// 1-based position in [`Self::ALL`], used for Alt+digit shortcuts.
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forwards transform requests to the generation service.
///
/// This flow has its own lifecycle: it never reads or writes the suggestion
/// store, and failures go back to the caller untouched.
#[derive(Clone)]
pub struct PersonalizationDispatcher {
    generator: Arc<dyn GenerationService>,
}

impl PersonalizationDispatcher {
    pub fn new(generator: Arc<dyn GenerationService>) -> Self {
        Self { generator }
    }

    pub fn dispatch(
        &self,
        kind: TransformKind,
        current_text: String,
    ) -> PendingRequest<PersonalizeResponse> {
        info!(action = %kind, chars = current_text.chars().count(), "personalize requested");
        let request = PersonalizeRequest {
            action: kind,
            content: current_text,
        };
        let generator = Arc::clone(&self.generator);
        PendingRequest::spawn(move || generator.personalize(&request))
    }
}

impl fmt::Debug for PersonalizationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonalizationDispatcher").finish_non_exhaustive()
    }
}
