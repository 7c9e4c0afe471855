/// Cuts `text` to `max_chars` characters, drops the trailing partial word
/// and marks the cut with `" ..."`. Shorter text is returned unchanged.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut = excerpt(text, max_chars);
    let kept = match cut.rsplit_once(' ') {
        Some((head, _)) => head,
        None => cut,
    };
    format!("{} ...", kept)
}

/// The leading sentence of `text`, capped at `max_len` characters and always
/// ending in terminal punctuation.
pub fn first_sentence(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let head = text.split(". ").next().unwrap_or(text).trim();
    let mut candidate = truncate_at_word(head, max_len);
    if !candidate.ends_with(['.', '!', '?']) {
        candidate.push('.');
    }
    candidate
}

/// First `n` characters of `text`.
pub fn excerpt(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sentence() {
        assert_eq!(
            first_sentence("Queen are a British rock band. They formed in 1970.", 320),
            "Queen are a British rock band."
        );
        assert_eq!(first_sentence("  no trailing stop  ", 320), "no trailing stop.");
        assert_eq!(first_sentence("Really? Yes", 320), "Really? Yes.");
        assert_eq!(first_sentence("Wow!", 320), "Wow!");
        assert_eq!(first_sentence("", 320), "");
    }

    #[test]
    fn test_first_sentence_truncates_long_heads() {
        let long = "word ".repeat(100);
        let sentence = first_sentence(&long, 20);
        assert_eq!(sentence, "word word word word ...");
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("short", 10), "short");
        assert_eq!(truncate_at_word("alpha beta gamma", 12), "alpha beta ...");
        assert_eq!(truncate_at_word("unbroken", 4), "unbr ...");
    }

    #[test]
    fn test_excerpt_counts_characters() {
        assert_eq!(excerpt("héllo wörld", 7), "héllo w");
        assert_eq!(excerpt("abc", 140), "abc");
        assert_eq!(excerpt("", 3), "");
    }
}
