use serde::{Deserialize, Serialize};

use composer_core::DomKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostMessage {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub event: HostEvent,
}

/// Events the host widget reports to the composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    TextChange { text: String, caret: usize },
    Key(DomKey),
    Pick { candidate: String },
    Hover { index: usize },
    Transliterate,
    LanguageCheck {
        armed: bool,
        #[serde(default)]
        current_language: Option<String>,
    },
    Toggle { enable: bool },
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub command: HostCommand,
}

/// Instructions for the host widget, in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    KeyResult { consumed: bool },
    Text { text: String },
    Caret { caret: usize },
    Suggestions {
        candidates: Vec<String>,
        active_index: usize,
    },
    LanguagePopup,
    TransliterateDone,
    Pong,
    Error(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
}
