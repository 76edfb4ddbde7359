//! Search-string normalization pipeline (§4.1): lowercase, strip a fixed
//! punctuation set, collapse whitespace, tokenize, drop stopwords and short
//! tokens.

const PUNCTUATION: &[char] = &['.', ',', '!', '?', '\'', '"', '-', '_', '(', ')', ':', ';'];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "with", "and", "or", "please", "meal", "combo", "some", "me", "i",
    "want", "like", "give", "get", "can", "you", "to", "for", "on", "my",
];

/// Lowercase, strip punctuation, collapse whitespace. Used both for the
/// "exact normalized equality always wins" check and as the input to
/// tokenization.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokenize a normalized string, dropping stopwords and tokens shorter than
/// 2 characters.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.len() >= 2 && !STOPWORDS.contains(t))
        .collect()
}
