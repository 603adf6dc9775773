use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use composer_core::{
    replace, route, ComposerState, Key, KeyRoute, SelectionController, SuggestionSet, Word,
    SEPARATOR,
};

use crate::config::{ComposerConfig, SuggestionConfig};
use crate::error::SuggestError;
use crate::host::ComposerHost;
use crate::langdetect::{
    DetectedLanguage, HttpLanguageDetector, LanguageCheck, LanguageDetectionTrigger,
    LanguageDetector,
};
use crate::suggest::{HttpSuggestionClient, RequestSlot, SuggestionClient};

/// Result of an async request, handed back to the engine that issued it.
#[derive(Debug)]
pub enum Completion {
    Lookup {
        generation: u64,
        word: String,
        result: Result<Vec<String>, SuggestError>,
    },
    FullText {
        generation: u64,
        input: String,
        result: Result<Vec<String>, SuggestError>,
    },
    Language {
        generation: u64,
        result: anyhow::Result<DetectedLanguage>,
    },
}

/// What applying a [`Completion`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Superseded by a newer request; nothing changed.
    Stale,
    Suggestions(usize),
    Cleared,
    Transliterated,
    Unchanged,
    LanguagePopup,
    NoPopup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The host must suppress the key's default action.
    Consumed,
    PassThrough,
}

impl KeyDisposition {
    pub fn is_consumed(self) -> bool {
        matches!(self, KeyDisposition::Consumed)
    }
}

struct Suggester {
    client: Arc<dyn SuggestionClient>,
    config: Arc<SuggestionConfig>,
}

/// Transliteration suggestions for the word under the caret of one composer.
///
/// The engine has a single owner which feeds it host events and applies the
/// completions it receives from [`next_completion`](Self::next_completion).
/// Every lookup supersedes the previous one; a result is applied only while
/// its request is still the latest.
pub struct ComposerEngine<H: ComposerHost> {
    host: H,
    suggester: Option<Suggester>,
    enabled: bool,
    language: Option<LanguageDetectionTrigger>,
    state: ComposerState,
    current_word: Option<Word>,
    selection: SelectionController,
    /// Text we committed after a pick; its echo must not start a lookup.
    pending_echo: Option<String>,
    lookup: RequestSlot,
    full_text: RequestSlot,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<H: ComposerHost> ComposerEngine<H> {
    pub fn new(host: H) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            host,
            suggester: None,
            enabled: false,
            language: None,
            state: ComposerState::default(),
            current_word: None,
            selection: SelectionController::new(),
            pending_echo: None,
            lookup: RequestSlot::new(),
            full_text: RequestSlot::new(),
            completions_tx,
            completions_rx,
        }
    }

    /// Builds an engine with HTTP backends for whatever `config` enables.
    /// A backend that fails to initialize is left out with a warning.
    pub fn from_config(config: &ComposerConfig, host: H) -> Self {
        let mut engine = Self::new(host);
        if let Some(suggest) = &config.transliteration {
            match HttpSuggestionClient::validate(suggest).and_then(|_| HttpSuggestionClient::new()) {
                Ok(client) => engine = engine.with_suggestions(Arc::new(client), suggest.clone()),
                Err(error) => warn!("transliteration disabled: {error:#}"),
            }
        }
        if config.language_detection.enable {
            match HttpLanguageDetector::new(&config.language_detection) {
                Ok(detector) => {
                    engine = engine.with_language_detection(
                        Arc::new(detector),
                        LanguageCheck::from_config(&config.language_detection),
                    )
                }
                Err(error) => warn!("language detection disabled: {error:#}"),
            }
        }
        engine
    }

    pub fn with_suggestions(
        mut self,
        client: Arc<dyn SuggestionClient>,
        config: SuggestionConfig,
    ) -> Self {
        self.enabled = config.enable;
        self.suggester = Some(Suggester {
            client,
            config: Arc::new(config),
        });
        self
    }

    pub fn with_language_detection(
        mut self,
        detector: Arc<dyn LanguageDetector>,
        check: LanguageCheck,
    ) -> Self {
        self.language = Some(LanguageDetectionTrigger::new(detector, check));
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        self.selection.suggestions()
    }

    pub fn language_check(&self) -> Option<&LanguageCheck> {
        self.language.as_ref().map(LanguageDetectionTrigger::check)
    }

    pub fn suggestions_enabled(&self) -> bool {
        self.enabled && self.suggester.is_some()
    }

    pub fn set_transliteration_enabled(&mut self, enable: bool) {
        self.enabled = enable;
        if !self.suggestions_enabled() {
            self.reset_lookup();
        }
    }

    pub fn update_language_check(&mut self, armed: bool, current_language: Option<String>) {
        if let Some(trigger) = self.language.as_mut() {
            trigger.arm(armed, current_language);
        }
    }

    pub fn on_text_change(&mut self, text: impl Into<String>, caret: usize) {
        self.state = ComposerState::new(text, caret);
        let echo = self.pending_echo.take();

        if !self.suggestions_enabled() || self.state.is_empty() {
            self.reset_lookup();
            return;
        }
        if echo.as_deref() == Some(self.state.text.as_str()) {
            debug!("skipping lookup for the text of an accepted suggestion");
            return;
        }

        let word = self.state.word_under_caret();
        if word.is_some() && word == self.current_word {
            return;
        }

        self.lookup.cancel();
        self.clear_suggestions();
        self.current_word = word.clone();
        if let Some(word) = word {
            self.issue_lookup(word.text);
        }
    }

    pub fn on_key_event(&mut self, key: Key) -> KeyDisposition {
        let route = route(key, self.selection.is_active());
        match route {
            KeyRoute::Ignore | KeyRoute::PassThrough => {}
            KeyRoute::MoveUp => {
                if self.selection.move_up() {
                    self.publish_suggestions();
                }
            }
            KeyRoute::MoveDown => {
                if self.selection.move_down() {
                    self.publish_suggestions();
                }
            }
            KeyRoute::Confirm => {
                let picked = self.selection.confirm();
                self.publish_suggestions();
                let replaced = picked.and_then(|candidate| self.on_suggestion_pick(&candidate));
                if replaced.is_none() {
                    self.insert_separator();
                }
            }
            KeyRoute::LanguageCheck => {
                if let Some(trigger) = self.language.as_mut() {
                    trigger.on_separator(&self.state, &self.completions_tx);
                }
            }
        }

        if route.intercepts() {
            KeyDisposition::Consumed
        } else {
            KeyDisposition::PassThrough
        }
    }

    /// Replaces the word under the caret with `candidate`. Returns the new
    /// state, or `None` when the caret is not on a word.
    pub fn on_suggestion_pick(&mut self, candidate: &str) -> Option<ComposerState> {
        let word = self.state.word_under_caret()?;
        let replacement = replace(&self.state.text, &word, candidate)?;

        self.lookup.cancel();
        self.clear_suggestions();
        self.current_word = None;
        self.pending_echo = Some(replacement.text.clone());
        self.commit(ComposerState::new(replacement.text, replacement.caret));
        Some(self.state.clone())
    }

    pub fn on_suggestion_hover(&mut self, index: usize) {
        if self.selection.hover(index) {
            self.publish_suggestions();
        }
    }

    /// Transliterates the whole text at once. Returns whether a request was
    /// issued.
    pub fn request_full_transliteration(&mut self) -> bool {
        let Some(suggester) = &self.suggester else {
            debug!("whole-input transliteration requested without a backend");
            return false;
        };
        let input = self.state.text.clone();
        if input.trim().is_empty() {
            self.host.transliteration_finished();
            return false;
        }

        let token = self.full_text.issue();
        let client = suggester.client.clone();
        let config = suggester.config.clone();
        let completions = self.completions_tx.clone();
        debug!(generation = token.generation(), "issuing whole-input transliteration");
        let handle = tokio::spawn(async move {
            let result = client.fetch(&input, &config, &token).await;
            let _ = completions.send(Completion::FullText {
                generation: token.generation(),
                input,
                result,
            });
        });
        self.full_text.attach(handle);
        true
    }

    /// Waits for the next settled request. Never yields `None` while the
    /// engine is alive.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    pub fn apply_completion(&mut self, completion: Completion) -> Applied {
        match completion {
            Completion::Lookup {
                generation,
                word,
                result,
            } => self.apply_lookup(generation, word, result),
            Completion::FullText {
                generation,
                input,
                result,
            } => self.apply_full_text(generation, input, result),
            Completion::Language { generation, result } => {
                let Some(trigger) = self.language.as_mut() else {
                    return Applied::Stale;
                };
                match trigger.resolve(generation, result) {
                    None => Applied::Stale,
                    Some(true) => {
                        self.host.show_language_popup();
                        Applied::LanguagePopup
                    }
                    Some(false) => Applied::NoPopup,
                }
            }
        }
    }

    fn apply_lookup(
        &mut self,
        generation: u64,
        word: String,
        result: Result<Vec<String>, SuggestError>,
    ) -> Applied {
        if !self.lookup.is_current(generation) {
            debug!(word = %word, generation, "dropping superseded lookup");
            return Applied::Stale;
        }
        self.lookup.settle(generation);
        match result {
            Ok(candidates) if candidates.is_empty() => {
                self.clear_suggestions();
                Applied::Cleared
            }
            Ok(candidates) => {
                let count = candidates.len();
                self.selection.set_candidates(candidates);
                self.publish_suggestions();
                Applied::Suggestions(count)
            }
            Err(error) if error.is_cancelled() => Applied::Stale,
            Err(error) => {
                warn!(word = %word, "transliteration lookup failed: {error}");
                self.clear_suggestions();
                Applied::Cleared
            }
        }
    }

    fn apply_full_text(
        &mut self,
        generation: u64,
        input: String,
        result: Result<Vec<String>, SuggestError>,
    ) -> Applied {
        if !self.full_text.is_current(generation) {
            return Applied::Stale;
        }
        self.full_text.settle(generation);
        let candidates = match result {
            Ok(candidates) => candidates,
            Err(error) if error.is_cancelled() => return Applied::Stale,
            Err(error) => {
                warn!("whole-input transliteration failed: {error}");
                Vec::new()
            }
        };
        self.host.transliteration_finished();

        if self.state.text != input {
            debug!("text changed during whole-input transliteration, dropping result");
            return Applied::Unchanged;
        }
        self.reset_lookup();
        match candidates.into_iter().next() {
            Some(first) => {
                self.commit(ComposerState::at_end(first));
                Applied::Transliterated
            }
            None => Applied::Unchanged,
        }
    }

    fn issue_lookup(&mut self, word: String) {
        let Some(suggester) = &self.suggester else {
            return;
        };
        let token = self.lookup.issue();
        let client = suggester.client.clone();
        let config = suggester.config.clone();
        let completions = self.completions_tx.clone();
        debug!(word = %word, generation = token.generation(), "issuing transliteration lookup");
        let handle = tokio::spawn(async move {
            let result = client.fetch(&word, &config, &token).await;
            let _ = completions.send(Completion::Lookup {
                generation: token.generation(),
                word,
                result,
            });
        });
        self.lookup.attach(handle);
    }

    fn insert_separator(&mut self) {
        let mut chars: Vec<char> = self.state.text.chars().collect();
        chars.insert(self.state.caret, SEPARATOR);
        let caret = self.state.caret + 1;
        self.commit(ComposerState::new(chars.into_iter().collect::<String>(), caret));
    }

    fn commit(&mut self, state: ComposerState) {
        self.state = state;
        self.host.commit_text(&self.state.text);
        self.host.reposition_caret(self.state.caret);
    }

    fn reset_lookup(&mut self) {
        self.lookup.cancel();
        self.current_word = None;
        self.clear_suggestions();
    }

    fn clear_suggestions(&mut self) {
        if self.selection.clear() {
            self.publish_suggestions();
        }
    }

    fn publish_suggestions(&mut self) {
        self.host.show_suggestions(self.selection.suggestions());
    }
}
