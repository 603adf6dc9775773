use serde::{Deserialize, Serialize};

use crate::util::char_len;
use crate::word::{locate, Word};

/// Text of the composer and the caret position inside it, in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerState {
    pub text: String,
    pub caret: usize,
}

impl ComposerState {
    /// Builds a state, clamping a caret past the end of `text` to its end.
    pub fn new(text: impl Into<String>, caret: usize) -> Self {
        let text = text.into();
        let caret = caret.min(char_len(&text));
        Self { text, caret }
    }

    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = char_len(&text);
        Self { text, caret }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn word_under_caret(&self) -> Option<Word> {
        locate(&self.text, self.caret)
    }

    /// Last whitespace-delimited token of the trimmed text.
    pub fn last_token(&self) -> &str {
        self.text.split_whitespace().next_back().unwrap_or("")
    }
}
