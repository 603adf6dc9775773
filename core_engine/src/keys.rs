use serde::{Deserialize, Serialize};

use crate::word::SEPARATOR;

/// Key code browsers report while an input method is composing.
pub const IME_COMPOSITION_KEY_CODE: u32 = 229;

/// Raw keyboard or text-input event as a host widget reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomKey {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub data: Option<String>,
}

/// The keys the composer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Separator,
    Composition,
    Other,
}

impl Key {
    pub fn from_dom(event: &DomKey) -> Self {
        if event.key_code == IME_COMPOSITION_KEY_CODE {
            return Key::Composition;
        }
        match event.code.as_str() {
            "ArrowUp" => return Key::ArrowUp,
            "ArrowDown" => return Key::ArrowDown,
            "Space" => return Key::Separator,
            _ => {}
        }
        let separator = SEPARATOR.to_string();
        if event.key == separator
            || event.key_code == SEPARATOR as u32
            || event.data.as_deref() == Some(separator.as_str())
        {
            Key::Separator
        } else {
            Key::Other
        }
    }
}

impl From<&DomKey> for Key {
    fn from(event: &DomKey) -> Self {
        Key::from_dom(event)
    }
}

/// What a key does given whether suggestions are showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRoute {
    /// Composition in progress; leave the event alone entirely.
    Ignore,
    MoveUp,
    MoveDown,
    Confirm,
    /// Separator typed with no suggestions: run the language check.
    LanguageCheck,
    PassThrough,
}

impl KeyRoute {
    pub fn intercepts(self) -> bool {
        matches!(self, KeyRoute::MoveUp | KeyRoute::MoveDown | KeyRoute::Confirm)
    }
}

pub fn route(key: Key, suggestions_active: bool) -> KeyRoute {
    match (key, suggestions_active) {
        (Key::Composition, _) => KeyRoute::Ignore,
        (Key::ArrowUp, true) => KeyRoute::MoveUp,
        (Key::ArrowDown, true) => KeyRoute::MoveDown,
        (Key::Separator, true) => KeyRoute::Confirm,
        (Key::Separator, false) => KeyRoute::LanguageCheck,
        _ => KeyRoute::PassThrough,
    }
}
