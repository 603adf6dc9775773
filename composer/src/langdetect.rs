use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tracing::{debug, warn};

use composer_core::ComposerState;

use crate::config::LanguageDetectionConfig;
use crate::engine::Completion;
use crate::suggest::RequestSlot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub language: String,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<DetectedLanguage>;
}

/// Detector backed by an HTTP endpoint taking `{"text"}` and answering `{"language"}`.
pub struct HttpLanguageDetector {
    endpoint: Url,
    timeout_ms: u64,
    client: Client,
}

impl HttpLanguageDetector {
    pub fn new(config: &LanguageDetectionConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(anyhow!(
                "language_detection is enabled but language_detection.endpoint is empty"
            ));
        }
        let endpoint = Url::parse(config.endpoint.trim()).with_context(|| {
            format!(
                "language_detection.endpoint {:?} is not a valid URL",
                config.endpoint
            )
        })?;

        Ok(Self {
            endpoint,
            timeout_ms: config.request_timeout_ms.max(1),
            client: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    async fn post(&self, text: &str) -> Result<DetectedLanguage> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&DetectRequest { text })
            .send()
            .await
            .context("failed to call language detection API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read language detection response body")?;
        if !status.is_success() {
            return Err(anyhow!("language detection failed ({status}): {body}"));
        }

        serde_json::from_str(&body).context("invalid language detection response format")
    }
}

#[async_trait]
impl LanguageDetector for HttpLanguageDetector {
    async fn detect(&self, text: &str) -> Result<DetectedLanguage> {
        timeout(Duration::from_millis(self.timeout_ms), self.post(text))
            .await
            .map_err(|_| anyhow!("language detection exceeded {}ms", self.timeout_ms))?
    }
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

/// When the "did you mean another language?" prompt may be offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCheck {
    pub enabled: bool,
    /// Cleared once the prompt was shown; the host re-arms it.
    pub armed: bool,
    pub active_locale: String,
    pub current_language: String,
    pub trigger_language: String,
}

impl LanguageCheck {
    pub fn from_config(config: &LanguageDetectionConfig) -> Self {
        Self {
            enabled: config.enable,
            armed: config.enable,
            active_locale: config.active_locale.clone(),
            current_language: config.current_language.clone(),
            trigger_language: config.trigger_language.clone(),
        }
    }

    pub fn should_check(&self) -> bool {
        self.enabled
            && self.armed
            && !self.trigger_language.is_empty()
            && self.current_language != self.active_locale
    }

    pub fn matches(&self, detected: &DetectedLanguage) -> bool {
        self.armed && detected.language == self.trigger_language
    }
}

pub struct LanguageDetectionTrigger {
    detector: Arc<dyn LanguageDetector>,
    check: LanguageCheck,
    slot: RequestSlot,
}

impl LanguageDetectionTrigger {
    pub fn new(detector: Arc<dyn LanguageDetector>, check: LanguageCheck) -> Self {
        Self {
            detector,
            check,
            slot: RequestSlot::new(),
        }
    }

    pub fn check(&self) -> &LanguageCheck {
        &self.check
    }

    pub fn arm(&mut self, armed: bool, current_language: Option<String>) {
        self.check.armed = armed;
        if let Some(language) = current_language {
            self.check.current_language = language;
        }
        if !armed {
            self.slot.cancel();
        }
    }

    /// Starts detection of the last word of `state`. Returns whether a
    /// detection was started.
    pub fn on_separator(
        &mut self,
        state: &ComposerState,
        completions: &UnboundedSender<Completion>,
    ) -> bool {
        if !self.check.should_check() {
            return false;
        }
        let word = state.last_token().to_string();
        if word.is_empty() {
            return false;
        }

        let token = self.slot.issue();
        let detector = self.detector.clone();
        let completions = completions.clone();
        debug!(word = %word, generation = token.generation(), "detecting language");
        let handle = tokio::spawn(async move {
            let result = detector.detect(&word).await;
            let _ = completions.send(Completion::Language {
                generation: token.generation(),
                result,
            });
        });
        self.slot.attach(handle);
        true
    }

    /// Consumes a detection result. Returns true when the prompt should be
    /// shown; the check is then disarmed.
    pub fn resolve(&mut self, generation: u64, result: Result<DetectedLanguage>) -> Option<bool> {
        if !self.slot.is_current(generation) {
            return None;
        }
        self.slot.settle(generation);
        match result {
            Ok(detected) if self.check.matches(&detected) => {
                self.check.armed = false;
                Some(true)
            }
            Ok(detected) => {
                debug!(language = %detected.language, "no language prompt");
                Some(false)
            }
            Err(error) => {
                warn!("language detection failed: {error:#}");
                Some(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{serve_once, FixedDetector};
    use tokio::sync::mpsc;

    fn check() -> LanguageCheck {
        LanguageCheck {
            enabled: true,
            armed: true,
            active_locale: "en".to_string(),
            current_language: "hi".to_string(),
            trigger_language: "hi".to_string(),
        }
    }

    #[test]
    fn check_requires_every_condition() {
        assert!(check().should_check());
        assert!(!LanguageCheck { enabled: false, ..check() }.should_check());
        assert!(!LanguageCheck { armed: false, ..check() }.should_check());
        assert!(!LanguageCheck {
            current_language: "en".to_string(),
            ..check()
        }
        .should_check());
        assert!(!LanguageCheck {
            trigger_language: String::new(),
            ..check()
        }
        .should_check());
    }

    #[tokio::test]
    async fn separator_detects_last_word_and_prompts_once() {
        let detector = Arc::new(FixedDetector::new("hi"));
        let mut trigger = LanguageDetectionTrigger::new(detector.clone(), check());
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(trigger.on_separator(&ComposerState::at_end("main ghar "), &tx));
        let Some(Completion::Language { generation, result }) = rx.recv().await else {
            panic!("expected a language completion");
        };
        assert_eq!(detector.seen(), vec!["ghar"]);
        assert_eq!(trigger.resolve(generation, result), Some(true));
        assert!(!trigger.check().armed);
        assert!(!trigger.on_separator(&ComposerState::at_end("main ghar"), &tx));
    }

    #[tokio::test]
    async fn other_language_does_not_prompt() {
        let mut trigger = LanguageDetectionTrigger::new(Arc::new(FixedDetector::new("ta")), check());
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(trigger.on_separator(&ComposerState::at_end("vanakkam"), &tx));
        let Some(Completion::Language { generation, result }) = rx.recv().await else {
            panic!("expected a language completion");
        };
        assert_eq!(trigger.resolve(generation, result), Some(false));
        assert!(trigger.check().armed);
    }

    #[tokio::test]
    async fn detector_failure_is_swallowed() {
        let mut trigger = LanguageDetectionTrigger::new(Arc::new(FixedDetector::failing()), check());
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(trigger.on_separator(&ComposerState::at_end("ghar"), &tx));
        let Some(Completion::Language { generation, result }) = rx.recv().await else {
            panic!("expected a language completion");
        };
        assert_eq!(trigger.resolve(generation, result), Some(false));
    }

    #[tokio::test]
    async fn blank_text_is_not_checked() {
        let mut trigger = LanguageDetectionTrigger::new(Arc::new(FixedDetector::new("hi")), check());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(!trigger.on_separator(&ComposerState::at_end("   "), &tx));
    }

    #[tokio::test]
    async fn http_detector_reads_language() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"language":"hi"}"#).await;
        let detector = HttpLanguageDetector::new(&LanguageDetectionConfig {
            enable: true,
            endpoint: url,
            ..LanguageDetectionConfig::default()
        })
        .unwrap();
        let detected = detector.detect("ghar").await.unwrap();
        assert_eq!(detected.language, "hi");
        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["text"], "ghar");
    }

    #[test]
    fn http_detector_requires_endpoint() {
        assert!(HttpLanguageDetector::new(&LanguageDetectionConfig::default()).is_err());
    }
}
