/// Number of chars in `text`. Caret and word offsets are counted in chars.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte position of the `char_index`-th char, or `None` past the end.
pub(crate) fn byte_offset(text: &str, char_index: usize) -> Option<usize> {
    if char_index == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(char_index)
}

/// Char offset of a caret reported in UTF-16 code units. A caret inside a
/// surrogate pair snaps to the char after it; past the end clamps to the end.
pub fn char_offset_from_utf16(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.chars().enumerate() {
        if units >= utf16 {
            return index;
        }
        units += ch.len_utf16();
    }
    char_len(text)
}

pub fn utf16_offset_from_chars(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}
