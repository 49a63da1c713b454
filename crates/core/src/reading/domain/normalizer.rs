use super::token::Token;

/// Splits text into comparable tokens.
///
/// Every whitespace-delimited chunk becomes exactly one [`Token`]. The
/// normalized form drops leading and trailing characters that are not letters
/// or digits and is lower-cased; inner punctuation such as apostrophes and
/// hyphens is kept. Chunks made only of punctuation still produce a token
/// with an empty normalized form.
pub fn normalize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .map(|chunk| Token::new(chunk, normalize_word(chunk)))
        .collect()
}

/// Normalized comparison key for a single chunk.
pub fn normalize_word(chunk: &str) -> String {
    // Lower-casing can append combining marks (`İ` → `i\u{307}`), so trim after.
    chunk
        .to_lowercase()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}
