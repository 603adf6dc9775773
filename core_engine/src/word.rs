use serde::{Deserialize, Serialize};

use crate::util::{byte_offset, char_len};

/// Word separator. Words are split on single occurrences of it, so two
/// consecutive separators enclose an empty word.
pub const SEPARATOR: char = ' ';

/// A word inside some source text. Offsets are char offsets, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Word {
    pub fn contains(&self, caret: usize) -> bool {
        self.start <= caret && caret <= self.end
    }
}

/// Finds the word under `caret`.
///
/// Both ends of a word's span count as inside it, so a caret right after the
/// last letter still selects the word. When the caret touches both a word's
/// end and the following word's start the earlier word wins. Returns `None`
/// when the caret sits on an empty word (between two separators, or in empty
/// text) or past the end of the text.
pub fn locate(text: &str, caret: usize) -> Option<Word> {
    let mut start = 0;
    for token in text.split(SEPARATOR) {
        let end = start + char_len(token);
        if start <= caret && caret <= end {
            if token.is_empty() {
                return None;
            }
            return Some(Word {
                text: token.to_string(),
                start,
                end,
            });
        }
        start = end + 1;
    }
    None
}

/// Result of substituting a word: the new text and where the caret goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub text: String,
    pub caret: usize,
}

/// Replaces `word` inside `text` with `replacement`.
///
/// A separator follows the replacement: one is inserted unless the word was
/// already followed by one, in which case the existing separator is reused.
/// The caret lands right after that separator. Returns `None` if `word` does
/// not describe a span of `text`.
pub fn replace(text: &str, word: &Word, replacement: &str) -> Option<Replacement> {
    if word.start > word.end {
        return None;
    }
    let head_end = byte_offset(text, word.start)?;
    let tail_start = byte_offset(text, word.end)?;
    if text[head_end..tail_start] != word.text {
        return None;
    }

    let tail = &text[tail_start..];
    let mut out = String::with_capacity(text.len() + replacement.len() + 1);
    out.push_str(&text[..head_end]);
    out.push_str(replacement);
    if !tail.starts_with(SEPARATOR) {
        out.push(SEPARATOR);
    }
    out.push_str(tail);

    Some(Replacement {
        text: out,
        caret: word.start + char_len(replacement) + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn word(text: &str, start: usize) -> Word {
        Word {
            text: text.to_string(),
            start,
            end: start + text.chars().count(),
        }
    }

    #[test]
    fn locates_word_inside() {
        let found = locate("I want pyaar", 10).unwrap();
        assert_eq!(found, word("pyaar", 7));
    }

    #[test]
    fn word_end_is_inclusive() {
        assert_eq!(locate("I want pyaar", 12), Some(word("pyaar", 7)));
        assert_eq!(locate("I want pyaar", 7), Some(word("pyaar", 7)));
        // caret 6 touches the end of "want" before the start of "pyaar"
        assert_eq!(locate("I want pyaar", 6), Some(word("want", 2)));
    }

    #[test]
    fn repeated_words_resolve_by_position() {
        assert_eq!(locate("ab ab", 4), Some(word("ab", 3)));
    }

    #[test]
    fn no_word_between_separators_or_in_empty_text() {
        assert_eq!(locate("a  b", 2), None);
        assert_eq!(locate("", 0), None);
        assert_eq!(locate("abc ", 4), None);
        assert_eq!(locate("abc", 9), None);
    }

    #[test]
    fn offsets_count_chars() {
        let found = locate("नमस्ते dost", 9).unwrap();
        assert_eq!(found, word("dost", 7));
    }

    #[test]
    fn replaces_last_word_and_appends_separator() {
        let text = "I want pyaar";
        let target = locate(text, 10).unwrap();
        let result = replace(text, &target, "प्यार").unwrap();
        assert_eq!(result.text, "I want प्यार ");
        // "I want " is 7 chars and "प्यार" is 5 chars, plus the separator
        assert_eq!(result.caret, 13);
    }

    #[test]
    fn reuses_following_separator() {
        let text = "pyaar is here";
        let target = locate(text, 2).unwrap();
        let result = replace(text, &target, "प्यार").unwrap();
        assert_eq!(result.text, "प्यार is here");
        assert_eq!(result.caret, 6);
    }

    #[test]
    fn multi_space_input_keeps_remaining_spaces() {
        let text = "a  b";
        let target = locate(text, 1).unwrap();
        let result = replace(text, &target, "x").unwrap();
        assert_eq!(result.text, "x  b");
        assert_eq!(result.caret, 2);
    }

    #[test]
    fn rejects_span_not_matching_text() {
        assert_eq!(replace("abc", &word("zz", 0), "y"), None);
        assert_eq!(replace("abc", &word("abcd", 0), "y"), None);
    }

    proptest! {
        #[test]
        fn located_word_spans_caret(text in "[a-c ]{0,12}", caret in 0usize..16) {
            let len = text.chars().count();
            let caret = caret % (len + 1);
            if let Some(found) = locate(&text, caret) {
                prop_assert!(found.start <= found.end);
                prop_assert!(found.end <= len);
                prop_assert!(found.contains(caret));
                prop_assert!(!found.text.is_empty());
                let slice: String = text.chars().skip(found.start).take(found.end - found.start).collect();
                prop_assert_eq!(slice, found.text);
            }
        }

        #[test]
        fn replace_is_deterministic(text in "[a-c ]{1,12}", caret in 0usize..12, candidate in "[x-z]{1,4}") {
            let caret = caret % (text.chars().count() + 1);
            if let Some(found) = locate(&text, caret) {
                let first = replace(&text, &found, &candidate).unwrap();
                let second = replace(&text, &found, &candidate).unwrap();
                prop_assert!(first.caret <= first.text.chars().count());
                prop_assert_eq!(first, second);
            }
        }
    }
}
