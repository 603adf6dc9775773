//! Transliteration-suggesting chat composer.
//!
//! [`ComposerEngine`] tracks the word under the caret, looks up candidates
//! for it over HTTP, lets the keyboard pick one, and offers a prompt when the
//! user seems to be typing in another language. [`bridge`] exposes the engine
//! to an out-of-process host over line-delimited JSON.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod langdetect;
pub mod protocol;
pub mod suggest;

#[cfg(test)]
mod testutil;

pub use bridge::ComposerBridge;
pub use config::{ComposerConfig, LanguageDetectionConfig, SuggestionConfig};
pub use engine::{Applied, Completion, ComposerEngine, KeyDisposition};
pub use error::SuggestError;
pub use host::{CommandBuffer, ComposerHost};
pub use langdetect::{DetectedLanguage, HttpLanguageDetector, LanguageCheck, LanguageDetector};
pub use suggest::{CancelToken, HttpSuggestionClient, RequestSlot, SuggestionClient};
