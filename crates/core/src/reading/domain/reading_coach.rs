use super::coaching::{CoachingFeedback, CoachingRequest};

/// Domain interface for generating coaching feedback on a reading attempt.
///
/// Output is non-deterministic and provider specific; the evaluator never
/// depends on it.
pub trait ReadingCoach: Send + Sync {
    fn coach(
        &self,
        request: &CoachingRequest,
    ) -> Result<CoachingFeedback, Box<dyn std::error::Error>>;
}
