use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;

use super::store::SuggestionState;

/// A single key as written in config files (`tab`, `esc`, `ctrl-j`, `f2`, `x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentifier {
    Tab,
    Esc,
    Enter,
    Backspace,
    F(u8),
    Char(char),
    Ctrl(char),
    Alt(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("unknown key {0:?}")]
    Unknown(String),
    #[error("accept and reject cannot both be bound to {0}")]
    Conflict(KeyIdentifier),
}

impl KeyIdentifier {
    /// Whether `key` is a press of this key.
    pub fn matches(self, key: &KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match self {
            Self::Tab => key.code == KeyCode::Tab && !ctrl && !alt,
            Self::Esc => key.code == KeyCode::Esc,
            Self::Enter => key.code == KeyCode::Enter && !ctrl && !alt,
            Self::Backspace => key.code == KeyCode::Backspace && !ctrl && !alt,
            Self::F(n) => key.code == KeyCode::F(n),
            Self::Char(c) => key.code == KeyCode::Char(c) && !ctrl && !alt,
            Self::Ctrl(c) => ctrl && key.code == KeyCode::Char(c),
            Self::Alt(c) => alt && !ctrl && key.code == KeyCode::Char(c),
        }
    }
}

impl FromStr for KeyIdentifier {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let lower = raw.to_ascii_lowercase();
        let single = |rest: &str| {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c.to_ascii_lowercase()),
                _ => None,
            }
        };
        let key = match lower.as_str() {
            "tab" => Self::Tab,
            "esc" | "escape" => Self::Esc,
            "enter" | "return" => Self::Enter,
            "backspace" => Self::Backspace,
            "space" => Self::Char(' '),
            _ => {
                let parsed = if let Some(rest) =
                    lower.strip_prefix("ctrl-").or_else(|| lower.strip_prefix("ctrl+"))
                {
                    single(rest).map(Self::Ctrl)
                } else if let Some(rest) =
                    lower.strip_prefix("alt-").or_else(|| lower.strip_prefix("alt+"))
                {
                    single(rest).map(Self::Alt)
                } else if let Some(n) = lower
                    .strip_prefix('f')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=12).contains(n))
                {
                    Some(Self::F(n))
                } else {
                    // Plain characters keep their case.
                    let mut chars = raw.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(Self::Char(c)),
                        _ => None,
                    }
                };
                parsed.ok_or_else(|| KeyError::Unknown(raw.to_string()))?
            }
        };
        Ok(key)
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tab => f.write_str("Tab"),
            Self::Esc => f.write_str("Esc"),
            Self::Enter => f.write_str("Enter"),
            Self::Backspace => f.write_str("Backspace"),
            Self::F(n) => write!(f, "F{n}"),
            Self::Char(' ') => f.write_str("Space"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Ctrl(c) => write!(f, "Ctrl-{c}"),
            Self::Alt(c) => write!(f, "Alt-{c}"),
        }
    }
}

/// What the author wants done with the visible suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionIntent {
    Accept,
    Reject,
}

/// The two suggestion keys.
///
/// They are only live while a suggestion is visible; at any other time they
/// fall through to normal editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    accept: KeyIdentifier,
    reject: KeyIdentifier,
}

impl KeyBindings {
    /// # Errors
    ///
    /// Returns [`KeyError::Conflict`] if both intents use the same key.
    pub fn new(accept: KeyIdentifier, reject: KeyIdentifier) -> Result<Self, KeyError> {
        if accept == reject {
            return Err(KeyError::Conflict(accept));
        }
        Ok(Self { accept, reject })
    }

    pub const fn accept_key(&self) -> KeyIdentifier {
        self.accept
    }

    pub const fn reject_key(&self) -> KeyIdentifier {
        self.reject
    }

    /// Whether `key` is the accept or reject key, whatever the state.
    pub fn is_bound(&self, key: &KeyEvent) -> bool {
        self.accept.matches(key) || self.reject.matches(key)
    }

    /// Translate `key` into an intent if a suggestion is visible.
    ///
    /// A `Some` result means the key has been consumed and must not reach
    /// the editor.
    pub fn dispatch(&self, key: &KeyEvent, state: &SuggestionState) -> Option<SuggestionIntent> {
        if !state.is_visible() {
            return None;
        }
        if self.accept.matches(key) {
            Some(SuggestionIntent::Accept)
        } else if self.reject.matches(key) {
            Some(SuggestionIntent::Reject)
        } else {
            None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            accept: KeyIdentifier::Tab,
            reject: KeyIdentifier::Esc,
        }
    }
}
