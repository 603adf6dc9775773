use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::config::SuggestionConfig;
use crate::error::SuggestError;
use crate::suggest::{CancelToken, SuggestionClient};

pub struct HttpSuggestionClient {
    client: Client,
}

impl HttpSuggestionClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    /// Checks that `config` describes a usable endpoint before any lookup runs.
    pub fn validate(config: &SuggestionConfig) -> Result<()> {
        Url::parse(config.endpoint.trim()).with_context(|| {
            format!(
                "transliteration.endpoint {:?} is not a valid URL",
                config.endpoint
            )
        })?;
        if config.input_language.trim().is_empty() || config.output_language.trim().is_empty() {
            anyhow::bail!("transliteration input_language and output_language must be set");
        }
        Ok(())
    }

    async fn post(&self, input: &str, config: &SuggestionConfig) -> Result<Vec<String>, SuggestError> {
        let payload = TransliterationRequest {
            input_language: &config.input_language,
            output_language: &config.output_language,
            input,
            provider: &config.provider,
            num_suggestions: config.max_suggestions,
        };

        let response = self
            .client
            .post(config.endpoint.trim())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::Remote {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;
        let parsed: TransliterationResponse = serde_json::from_slice(&body)?;
        Ok(parsed.suggestions.unwrap_or_default())
    }
}

#[async_trait]
impl SuggestionClient for HttpSuggestionClient {
    async fn fetch(
        &self,
        input: &str,
        config: &SuggestionConfig,
        token: &CancelToken,
    ) -> Result<Vec<String>, SuggestError> {
        if token.is_cancelled() {
            return Err(SuggestError::Cancelled);
        }
        let limit = config.request_timeout_ms.max(1);
        let result = match timeout(Duration::from_millis(limit), self.post(input, config)).await {
            Ok(result) => result,
            Err(_) => Err(SuggestError::Timeout(limit)),
        };
        // The response may have arrived after a newer keystroke.
        if token.is_cancelled() {
            return Err(SuggestError::Cancelled);
        }
        result
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransliterationRequest<'a> {
    input_language: &'a str,
    output_language: &'a str,
    input: &'a str,
    provider: &'a str,
    num_suggestions: u32,
}

#[derive(Debug, Deserialize)]
struct TransliterationResponse {
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}
