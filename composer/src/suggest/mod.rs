mod http;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

pub use http::HttpSuggestionClient;

use crate::config::SuggestionConfig;
use crate::error::SuggestError;

#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn fetch(
        &self,
        input: &str,
        config: &SuggestionConfig,
        token: &CancelToken,
    ) -> Result<Vec<String>, SuggestError>;
}

/// Identifies one issued request. It is cancelled as soon as its slot issues
/// a newer token or is cancelled outright.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }
}

/// A slot holding at most one in-flight request.
#[derive(Debug, Default)]
pub struct RequestSlot {
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes whatever is pending and hands out a token for the next request.
    pub fn issue(&mut self) -> CancelToken {
        self.cancel();
        CancelToken {
            generation: self.latest.load(Ordering::SeqCst),
            latest: self.latest.clone(),
        }
    }

    pub fn attach(&mut self, handle: JoinHandle<()>) {
        self.handle = Some(handle);
    }

    /// Invalidates the current token and aborts its task if it is still running.
    pub fn cancel(&mut self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Marks the request for `generation` settled, dropping its task handle.
    pub fn settle(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.handle = None;
        }
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
