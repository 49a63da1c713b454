use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::pipeline::evaluation_logger::EvaluationLogger;
use crate::reading::domain::aligner;
use crate::reading::domain::alignment_result::AlignmentResult;
use crate::reading::domain::audio_clip::AudioClip;
use crate::reading::domain::coaching::{CoachingFeedback, CoachingRequest};
use crate::reading::domain::reading_coach::ReadingCoach;
use crate::reading::domain::speech_transcriber::SpeechTranscriber;

/// Where the student's reading comes from.
pub enum ReadingSource {
    Transcript(String),
    Audio(AudioClip),
}

/// Everything produced for one reading attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingReport {
    pub transcript: String,
    pub result: AlignmentResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<CoachingFeedback>,
}

/// Reading evaluation: transcribe → align → coach.
///
/// Only alignment is mandatory. Transcription runs when the source is audio;
/// coaching runs when a coach is configured.
pub struct EvaluateReadingUseCase {
    transcriber: Option<Box<dyn SpeechTranscriber>>,
    coach: Option<Box<dyn ReadingCoach>>,
    grade_level: u8,
}

impl EvaluateReadingUseCase {
    pub fn new(
        transcriber: Option<Box<dyn SpeechTranscriber>>,
        coach: Option<Box<dyn ReadingCoach>>,
        grade_level: u8,
    ) -> Self {
        Self {
            transcriber,
            coach,
            grade_level,
        }
    }

    /// Scores a transcript against the target passage.
    pub fn evaluate(&self, target: &str, transcript: &str) -> AlignmentResult {
        aligner::evaluate(target, transcript)
    }

    pub fn run(
        &self,
        target: &str,
        source: ReadingSource,
        logger: &mut dyn EvaluationLogger,
    ) -> Result<ReadingReport, Box<dyn std::error::Error>> {
        // 1. Obtain the transcript
        let transcript = match source {
            ReadingSource::Transcript(text) => text,
            ReadingSource::Audio(clip) => {
                let transcriber = self
                    .transcriber
                    .as_ref()
                    .ok_or("Audio given but no speech transcriber is configured")?;
                let start = Instant::now();
                let text = transcriber.transcribe(&clip)?;
                logger.timing("transcribe", elapsed_ms(start));
                text
            }
        };

        // 2. Align against the target
        let start = Instant::now();
        let result = self.evaluate(target, &transcript);
        logger.timing("align", elapsed_ms(start));
        logger.scored(&result);
        logger.info(&format!(
            "Accuracy {:.1}% ({} of {} words correct)",
            result.accuracy,
            result.correct_count(),
            result.words.len()
        ));

        // 3. Coaching never fails the evaluation
        let feedback = self.coach.as_ref().map(|coach| {
            let request =
                CoachingRequest::from_result(target, &transcript, &result, self.grade_level);
            let start = Instant::now();
            let feedback = coach.coach(&request).unwrap_or_else(|e| {
                log::warn!("Coaching failed, using fallback feedback: {e}");
                CoachingFeedback::fallback()
            });
            logger.timing("coach", elapsed_ms(start));
            feedback
        });

        Ok(ReadingReport {
            transcript,
            result,
            feedback,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
