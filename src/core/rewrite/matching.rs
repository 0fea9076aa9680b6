//! Phrase matching against a lowercased query.

/// True if `phrase_lower` occurs in `query_lower`.
///
/// Multi-word phrases match as plain substrings. Single words must also sit
/// on word boundaries, so "sf" matches "is sf up" but not "transfer".
pub fn phrase_matches(phrase_lower: &str, query_lower: &str) -> bool {
    if !query_lower.contains(phrase_lower) {
        return false;
    }
    if phrase_lower.contains(' ') {
        return true;
    }
    matches_on_word_boundary(phrase_lower, query_lower)
}

/// Word characters as regex `\w` sees them.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `\b<word>\b` semantics without building a pattern per call: some
/// occurrence of `word_lower` must start and end on a word boundary.
pub fn matches_on_word_boundary(word_lower: &str, query_lower: &str) -> bool {
    let (Some(first), Some(last)) = (word_lower.chars().next(), word_lower.chars().next_back())
    else {
        return false;
    };

    let mut from = 0;
    while let Some(offset) = query_lower[from..].find(word_lower) {
        let start = from + offset;
        let end = start + word_lower.len();

        let before = query_lower[..start].chars().next_back();
        let after = query_lower[end..].chars().next();
        let starts_on_boundary = before.map_or(false, is_word_char) != is_word_char(first);
        let ends_on_boundary = after.map_or(false, is_word_char) != is_word_char(last);
        if starts_on_boundary && ends_on_boundary {
            return true;
        }

        // Overlapping occurrences are still candidates.
        from = start + first.len_utf8();
    }
    false
}
