//! Pure composer logic: locating the word under the caret, replacing it with
//! a chosen candidate, tracking the highlighted candidate, and routing keys.
//!
//! Nothing in here performs I/O; the async side lives in the `composer` crate.

pub mod keys;
pub mod selection;
pub mod state;
mod util;
pub mod word;

pub use keys::{route, DomKey, Key, KeyRoute, IME_COMPOSITION_KEY_CODE};
pub use selection::{SelectionController, SuggestionSet};
pub use state::ComposerState;
pub use util::{char_offset_from_utf16, utf16_offset_from_chars};
pub use word::{locate, replace, Replacement, Word, SEPARATOR};
