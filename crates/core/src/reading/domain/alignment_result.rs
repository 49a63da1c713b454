use serde::{Deserialize, Serialize};

/// Whether a target word was reproduced in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Correct,
    Misread,
}

impl std::fmt::Display for WordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordStatus::Correct => write!(f, "correct"),
            WordStatus::Misread => write!(f, "misread"),
        }
    }
}

/// A word of the target passage with its evaluated status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWord {
    #[serde(rename = "word")]
    pub surface: String,
    pub status: WordStatus,
}

impl TargetWord {
    pub fn correct(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            status: WordStatus::Correct,
        }
    }

    pub fn misread(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            status: WordStatus::Misread,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.status == WordStatus::Correct
    }
}

/// Word-level evaluation of a reading attempt.
///
/// `words` follows the target passage order and always has one entry per
/// target token. `accuracy` is a percentage rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub accuracy: f64,
    pub words: Vec<TargetWord>,
}

impl AlignmentResult {
    /// Builds a result from labeled words, deriving the accuracy.
    pub fn from_words(words: Vec<TargetWord>) -> Self {
        let correct = words.iter().filter(|w| w.is_correct()).count();
        Self {
            accuracy: accuracy_percent(correct, words.len()),
            words,
        }
    }

    pub fn empty() -> Self {
        Self {
            accuracy: 0.0,
            words: Vec::new(),
        }
    }

    pub fn correct_count(&self) -> usize {
        self.words.iter().filter(|w| w.is_correct()).count()
    }

    pub fn misread_count(&self) -> usize {
        self.words.len() - self.correct_count()
    }

    /// Surface forms of every misread word, in passage order.
    pub fn misread_words(&self) -> Vec<String> {
        self.words
            .iter()
            .filter(|w| !w.is_correct())
            .map(|w| w.surface.clone())
            .collect()
    }
}

/// `100 * correct / total`, rounded to one decimal. Zero when `total` is zero.
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * correct as f64 / total as f64;
    (raw * 10.0).round() / 10.0
}
