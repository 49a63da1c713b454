use serde::{Deserialize, Serialize};

use super::alignment_result::AlignmentResult;

pub const DEFAULT_ENCOURAGEMENT: &str = "Nice reading!";
pub const FALLBACK_ENCOURAGEMENT: &str = "Nice reading! Keep it up.";

/// Everything a coach needs to comment on one reading attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct CoachingRequest {
    pub target: String,
    pub transcript: String,
    pub misread_words: Vec<String>,
    /// School grade, 0 for kindergarten.
    pub grade_level: u8,
}

impl CoachingRequest {
    pub fn from_result(
        target: &str,
        transcript: &str,
        result: &AlignmentResult,
        grade_level: u8,
    ) -> Self {
        Self {
            target: target.to_string(),
            transcript: transcript.to_string(),
            misread_words: result.misread_words(),
            grade_level,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTip {
    pub word: String,
    pub tip: String,
}

/// Feedback shown to the student after a reading attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingFeedback {
    #[serde(default = "default_encouragement")]
    pub encouragement: String,
    #[serde(default)]
    pub tips: Vec<WordTip>,
    #[serde(default)]
    pub questions: Vec<String>,
}

fn default_encouragement() -> String {
    DEFAULT_ENCOURAGEMENT.to_string()
}

impl CoachingFeedback {
    /// Generic feedback used when the coach's answer is unusable.
    pub fn fallback() -> Self {
        Self {
            encouragement: FALLBACK_ENCOURAGEMENT.to_string(),
            tips: Vec::new(),
            questions: Vec::new(),
        }
    }

    /// Parses a coach's JSON answer, defaulting any missing keys.
    ///
    /// Returns `None` when the text is not a JSON object of the expected
    /// shape.
    pub fn parse(content: &str) -> Option<Self> {
        serde_json::from_str(content.trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::domain::alignment_result::TargetWord;

    #[test]
    fn test_parse_complete_answer() {
        let content = r#"{
            "encouragement": "Great job!",
            "tips": [{"word": "cat", "tip": "Say each sound: c-a-t."}],
            "questions": ["Where did the cat sit?", "What colour was the cat?"]
        }"#;
        let fb = CoachingFeedback::parse(content).unwrap();
        assert_eq!(fb.encouragement, "Great job!");
        assert_eq!(fb.tips.len(), 1);
        assert_eq!(fb.tips[0].word, "cat");
        assert_eq!(fb.questions.len(), 2);
    }

    #[test]
    fn test_parse_defaults_missing_keys() {
        let fb = CoachingFeedback::parse(r#"{"questions": ["Why?"]}"#).unwrap();
        assert_eq!(fb.encouragement, DEFAULT_ENCOURAGEMENT);
        assert!(fb.tips.is_empty());
        assert_eq!(fb.questions, vec!["Why?".to_string()]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(CoachingFeedback::parse("Great reading, keep going!").is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(CoachingFeedback::parse(r#"{"tips": "sound it out"}"#).is_none());
        assert!(CoachingFeedback::parse("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_fallback() {
        let fb = CoachingFeedback::fallback();
        assert_eq!(fb.encouragement, FALLBACK_ENCOURAGEMENT);
        assert!(fb.tips.is_empty());
        assert!(fb.questions.is_empty());
    }

    #[test]
    fn test_request_from_result_collects_misreads() {
        let result = AlignmentResult::from_words(vec![
            TargetWord::correct("The"),
            TargetWord::misread("cat"),
            TargetWord::misread("sat."),
        ]);
        let req = CoachingRequest::from_result("The cat sat.", "the dog", &result, 2);
        assert_eq!(req.misread_words, vec!["cat".to_string(), "sat.".to_string()]);
        assert_eq!(req.grade_level, 2);
        assert_eq!(req.transcript, "the dog");
    }
}
