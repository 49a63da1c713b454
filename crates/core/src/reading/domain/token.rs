/// One whitespace-delimited word of a passage or transcript.
///
/// `surface` is the chunk exactly as it appeared and is what gets displayed;
/// `normalized` is the comparison key used by the aligner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub normalized: String,
}

impl Token {
    pub fn new(surface: impl Into<String>, normalized: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            normalized: normalized.into(),
        }
    }

    pub fn matches(&self, other: &Token) -> bool {
        self.normalized == other.normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_fields() {
        let t = Token::new("Cat!", "cat");
        assert_eq!(t.surface, "Cat!");
        assert_eq!(t.normalized, "cat");
    }

    #[test]
    fn test_matches_compares_normalized_form_only() {
        let a = Token::new("The", "the");
        let b = Token::new("the,", "the");
        let c = Token::new("then", "then");
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }
}
