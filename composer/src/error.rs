use thiserror::Error;

/// Failure of a transliteration lookup.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("transliteration endpoint answered {status}: {status_text}")]
    Remote { status: u16, status_text: String },

    #[error("transliteration request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("transliteration request exceeded {0}ms")]
    Timeout(u64),

    #[error("invalid transliteration response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("transliteration request superseded")]
    Cancelled,
}

impl SuggestError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SuggestError::Cancelled)
    }
}
