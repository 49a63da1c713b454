use serde::{Deserialize, Serialize};

use crate::pipeline::evaluation_logger::EvaluationLogger;
use crate::reading::domain::alignment_result::AlignmentResult;

/// One reading attempt to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub id: String,
    pub target: String,
    #[serde(default)]
    pub transcript: String,
}

/// Scored reading attempt. Serializes as `{ id, accuracy, words }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub id: String,
    #[serde(flatten)]
    pub result: AlignmentResult,
}

/// Abstracts how many independent evaluations are executed.
///
/// Implementations must return exactly one outcome per item, in input order.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        items: Vec<EvaluationItem>,
        logger: &mut dyn EvaluationLogger,
    ) -> Result<Vec<EvaluationOutcome>, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::domain::alignment_result::TargetWord;

    #[test]
    fn test_item_transcript_defaults_to_empty() {
        let item: EvaluationItem =
            serde_json::from_str(r#"{"id": "s1", "target": "the cat"}"#).unwrap();
        assert_eq!(item.transcript, "");
    }

    #[test]
    fn test_outcome_flattens_result() {
        let outcome = EvaluationOutcome {
            id: "s1".to_string(),
            result: AlignmentResult::from_words(vec![TargetWord::correct("cat")]),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["accuracy"], 100.0);
        assert_eq!(json["words"][0]["word"], "cat");
    }
}
