//! Contract with the external text-generation service.
//!
//! Calls block, so they run on a worker thread and come back through a
//! [`PendingRequest`] that the UI loop polls. Aborting a request guarantees
//! its result is never delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::GenerationError;
use super::personalize::TransformKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub current_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub suggestion_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizeRequest {
    pub action: TransformKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizeResponse {
    pub content: String,
}

/// Anything that can turn draft text into suggestions.
pub trait GenerationService: Send + Sync {
    /// Propose a continuation of `request.current_text`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the service cannot produce one.
    fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse, GenerationError>;

    /// Rewrite the draft according to `request.action`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the service cannot produce one.
    fn personalize(
        &self,
        request: &PersonalizeRequest,
    ) -> Result<PersonalizeResponse, GenerationError>;
}

/// JSON-over-HTTP generation service.
///
/// `POST <endpoint>/suggest` and `POST <endpoint>/personalize`.
pub struct HttpGenerator {
    base_url: String,
    client: Client,
}

impl HttpGenerator {
    /// # Errors
    ///
    /// Fails if `endpoint` is blank or the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GenerationError> {
        if endpoint.trim().is_empty() {
            return Err(GenerationError::Unavailable(
                "generation endpoint is empty".to_string(),
            ));
        }
        Ok(Self {
            base_url: endpoint.trim().trim_end_matches('/').to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, GenerationError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl GenerationService for HttpGenerator {
    fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse, GenerationError> {
        self.post("suggest", request)
    }

    fn personalize(
        &self,
        request: &PersonalizeRequest,
    ) -> Result<PersonalizeResponse, GenerationError> {
        self.post("personalize", request)
    }
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Offline generator used when no endpoint is configured.
#[derive(Debug, Default)]
pub struct HeuristicGenerator;

const CONTINUATIONS: &[(&str, &str)] = &[
    ("hello", "world"),
    ("thank", "you for reading"),
    ("thanks", "for reading"),
    ("for", "example"),
    ("in", "the meantime"),
    ("the", "following"),
    ("we", "can start with the basics"),
    ("let's", "start with the basics"),
    ("this", "post walks through the details"),
    ("because", "it keeps things simple"),
];

impl HeuristicGenerator {
    fn continuation(text: &str) -> String {
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            return String::new();
        }
        let last_word = trimmed
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if let Some((_, next)) = CONTINUATIONS.iter().find(|(word, _)| *word == last_word) {
            return (*next).to_string();
        }
        if trimmed.ends_with(['.', '!', '?']) {
            "Here is what that looks like in practice.".to_string()
        } else if trimmed.ends_with(':') {
            "first, the setup.".to_string()
        } else {
            "and why it matters.".to_string()
        }
    }
}

impl GenerationService for HeuristicGenerator {
    fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse, GenerationError> {
        Ok(SuggestResponse {
            suggestion_text: Self::continuation(&request.current_text),
        })
    }

    fn personalize(
        &self,
        request: &PersonalizeRequest,
    ) -> Result<PersonalizeResponse, GenerationError> {
        let body = request.content.trim();
        if body.is_empty() {
            return Err(GenerationError::Unavailable(
                "nothing to personalize yet".to_string(),
            ));
        }
        let content = match request.action {
            TransformKind::Expand => format!("{body} {}", Self::continuation(body)),
            TransformKind::Improve => tidy_sentences(body),
            TransformKind::Seo => {
                let title: String = body
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(60)
                    .collect();
                format!("# {}\n\n{body}", title.trim())
            }
            TransformKind::Suggest => format!(
                "{body}\n\nIdeas:\n- A worked example\n- Common pitfalls\n- Further reading"
            ),
        };
        Ok(PersonalizeResponse { content })
    }
}

/// Collapse runs of spaces and capitalize the first letter of each sentence.
fn tidy_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capitalize = true;
    let mut last_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !last_space {
                out.push(ch);
            }
            last_space = true;
            continue;
        }
        last_space = false;
        if capitalize && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
            if matches!(ch, '.' | '!' | '?' | '\n') {
                capitalize = true;
            } else if !ch.is_whitespace() {
                capitalize = false;
            }
        }
    }
    out
}

/// Shared flag that tells a worker its result is no longer wanted.
#[derive(Debug, Clone, Default)]
struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// An in-flight generation call.
///
/// Dropping the request aborts it. Results of aborted requests are never
/// returned.
#[derive(Debug)]
pub struct PendingRequest<T> {
    rx: Option<Receiver<Result<T, GenerationError>>>,
    abort: AbortHandle,
}

impl<T: Send + 'static> PendingRequest<T> {
    /// Run `job` on a worker thread.
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<T, GenerationError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let abort = AbortHandle::default();
        let flag = abort.clone();
        let fallback = tx.clone();
        let spawned = std::thread::Builder::new()
            .name("inkling-generate".to_string())
            .spawn(move || {
                let result = job();
                if flag.is_aborted() {
                    debug!("result of aborted generation dropped");
                    return;
                }
                let _ = tx.send(result);
            });
        if let Err(err) = spawned {
            warn!(%err, "failed to spawn generation worker");
            let _ = fallback.send(Err(GenerationError::Unavailable(format!(
                "could not start worker: {err}"
            ))));
        }
        Self {
            rx: Some(rx),
            abort,
        }
    }
}

impl<T> PendingRequest<T> {
    /// A request that has already finished with `result`.
    #[cfg(test)]
    fn ready(result: Result<T, GenerationError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            rx: Some(rx),
            abort: AbortHandle::default(),
        }
    }

    #[cfg(test)]
    fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    #[cfg(test)]
    fn abort(&self) {
        self.abort.abort();
    }

    /// Whether a result has already been handed out.
    #[cfg(test)]
    const fn is_finished(&self) -> bool {
        self.rx.is_none()
    }

    /// Take the result if it has arrived. Never blocks.
    pub fn try_take(&mut self) -> Option<Result<T, GenerationError>> {
        if self.abort.is_aborted() {
            return None;
        }
        let outcome = match self.rx.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(worker_gone()),
        };
        self.rx = None;
        Some(outcome)
    }

    /// Block up to `timeout` for the result.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<T, GenerationError>> {
        if self.abort.is_aborted() {
            return None;
        }
        let outcome = match self.rx.as_ref()?.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(worker_gone()),
        };
        self.rx = None;
        Some(outcome)
    }
}

impl<T> Drop for PendingRequest<T> {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

fn worker_gone() -> GenerationError {
    GenerationError::Unavailable("generation worker exited without a result".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_suggest_request_wire_format() {
        let request = SuggestRequest {
            current_text: "Hello".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"currentText":"Hello"}"#
        );
        let response: SuggestResponse =
            serde_json::from_str(r#"{"suggestionText":"world"}"#).unwrap();
        assert_eq!(response.suggestion_text, "world");
    }

    #[test]
    fn test_personalize_request_wire_format() {
        let request = PersonalizeRequest {
            action: TransformKind::Seo,
            content: "Draft".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"action":"seo","content":"Draft"}"#
        );
    }

    #[test]
    fn test_http_generator_rejects_blank_endpoint() {
        let err = HttpGenerator::new("  ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[test]
    fn test_http_generator_joins_paths() {
        let generator = HttpGenerator::new("http://localhost:8080/api/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(generator.url("suggest"), "http://localhost:8080/api/suggest");
    }

    #[test]
    fn test_heuristic_continues_known_words() {
        let generator = HeuristicGenerator;
        let response = generator
            .suggest(&SuggestRequest {
                current_text: "Hello".to_string(),
            })
            .unwrap();
        assert_eq!(response.suggestion_text, "world");
    }

    #[test]
    fn test_heuristic_has_nothing_for_blank_text() {
        let response = HeuristicGenerator
            .suggest(&SuggestRequest {
                current_text: "   ".to_string(),
            })
            .unwrap();
        assert!(response.suggestion_text.is_empty());
    }

    #[test]
    fn test_heuristic_personalize_transforms() {
        let improve = HeuristicGenerator
            .personalize(&PersonalizeRequest {
                action: TransformKind::Improve,
                content: "first  point. second point".to_string(),
            })
            .unwrap();
        assert_eq!(improve.content, "First point. Second point");

        let seo = HeuristicGenerator
            .personalize(&PersonalizeRequest {
                action: TransformKind::Seo,
                content: "Rust tips\nbody".to_string(),
            })
            .unwrap();
        assert!(seo.content.starts_with("# Rust tips\n\n"));

        let blank = HeuristicGenerator.personalize(&PersonalizeRequest {
            action: TransformKind::Expand,
            content: String::new(),
        });
        assert!(blank.is_err());
    }

    #[test]
    fn test_pending_request_delivers_once() {
        let mut pending = PendingRequest::spawn(|| Ok::<_, GenerationError>(7));
        assert_eq!(pending.wait_timeout(WAIT).unwrap().unwrap(), 7);
        assert!(pending.is_finished());
        assert!(pending.try_take().is_none());
    }

    #[test]
    fn test_aborted_request_never_delivers() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let mut pending = PendingRequest::spawn(move || {
            let _ = release_rx.lock().unwrap().recv();
            Ok::<_, GenerationError>("late")
        });
        pending.abort();
        release_tx.send(()).unwrap();
        assert!(pending.wait_timeout(Duration::from_millis(200)).is_none());
        assert!(pending.try_take().is_none());
    }

    #[test]
    fn test_drop_aborts_request() {
        let pending = PendingRequest::<()>::ready(Ok(()));
        let handle = pending.abort_handle();
        assert!(!handle.is_aborted());
        drop(pending);
        assert!(handle.is_aborted());
    }

    #[test]
    fn test_worker_error_is_delivered() {
        let mut pending = PendingRequest::<String>::spawn(|| {
            Err(GenerationError::Unavailable("down".to_string()))
        });
        let result = pending.wait_timeout(WAIT).unwrap();
        assert!(matches!(result, Err(GenerationError::Unavailable(msg)) if msg == "down"));
    }
}
