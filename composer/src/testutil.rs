//! Fakes and helpers shared by the crate's tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::SuggestionConfig;
use crate::error::SuggestError;
use crate::langdetect::{DetectedLanguage, LanguageDetector};
use crate::suggest::{CancelToken, SuggestionClient};

/// Serves exactly one HTTP response and yields the request body it received.
pub async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/transliterate", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        let request_body = loop {
            let read = stream.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..read]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= split + 4 + length || read == 0 {
                    break String::from_utf8_lossy(&raw[split + 4..]).to_string();
                }
            }
            if read == 0 {
                break String::new();
            }
        };
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request_body
    });
    (url, handle)
}

/// In-memory transliteration backend with per-input canned replies.
#[derive(Default)]
pub struct ScriptedClient {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

struct Reply {
    delay_ms: u64,
    outcome: Result<Vec<String>, u16>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, input: &str, candidates: &[&str]) -> Self {
        self.delayed(input, 0, candidates)
    }

    pub fn delayed(mut self, input: &str, delay_ms: u64, candidates: &[&str]) -> Self {
        self.replies.insert(
            input.to_string(),
            Reply {
                delay_ms,
                outcome: Ok(candidates.iter().map(|c| c.to_string()).collect()),
            },
        );
        self
    }

    pub fn failing(mut self, input: &str, status: u16) -> Self {
        self.replies.insert(
            input.to_string(),
            Reply {
                delay_ms: 0,
                outcome: Err(status),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionClient for ScriptedClient {
    async fn fetch(
        &self,
        input: &str,
        _config: &SuggestionConfig,
        token: &CancelToken,
    ) -> Result<Vec<String>, SuggestError> {
        self.calls.lock().unwrap().push(input.to_string());
        let (delay_ms, outcome) = match self.replies.get(input) {
            Some(reply) => (reply.delay_ms, reply.outcome.clone()),
            None => (0, Ok(Vec::new())),
        };
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        if token.is_cancelled() {
            return Err(SuggestError::Cancelled);
        }
        outcome.map_err(|status| SuggestError::Remote {
            status,
            status_text: "scripted failure".to_string(),
        })
    }
}

/// Detector that always reports the same language, or always fails.
pub struct FixedDetector {
    language: Option<String>,
    seen: Mutex<Vec<String>>,
}

impl FixedDetector {
    pub fn new(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            language: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageDetector for FixedDetector {
    async fn detect(&self, text: &str) -> anyhow::Result<DetectedLanguage> {
        self.seen.lock().unwrap().push(text.to_string());
        match &self.language {
            Some(language) => Ok(DetectedLanguage {
                language: language.clone(),
            }),
            None => Err(anyhow::anyhow!("detector offline")),
        }
    }
}
