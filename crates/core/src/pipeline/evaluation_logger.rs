use std::collections::BTreeMap;
use std::time::Instant;

use crate::reading::domain::alignment_result::AlignmentResult;

/// Observer for evaluation runs.
///
/// Use cases report stage timings and scored readings through it without
/// knowing whether the caller prints them or ignores them.
pub trait EvaluationLogger: Send {
    /// Report how many readings have been scored so far.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one reading.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record the alignment of one reading.
    fn scored(&mut self, result: &AlignmentResult);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Logger that discards all events.
pub struct NullEvaluationLogger;

impl EvaluationLogger for NullEvaluationLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn scored(&mut self, _result: &AlignmentResult) {}
    fn info(&mut self, _message: &str) {}
}

/// Running totals over every scored reading.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReadingTally {
    pub accuracies: Vec<f64>,
    pub target_words: usize,
    pub misread_words: usize,
    pub perfect_readings: usize,
}

impl ReadingTally {
    fn add(&mut self, result: &AlignmentResult) {
        self.accuracies.push(result.accuracy);
        self.target_words += result.words.len();
        self.misread_words += result.misread_count();
        if !result.words.is_empty() && result.misread_count() == 0 {
            self.perfect_readings += 1;
        }
    }

    pub fn readings(&self) -> usize {
        self.accuracies.len()
    }

    pub fn mean_accuracy(&self) -> f64 {
        mean(&self.accuracies)
    }
}

/// CLI logger that forwards to the `log` crate and keeps stage timings and a
/// [`ReadingTally`] for the end-of-run summary.
///
/// Progress lines are throttled to every `throttle` readings.
pub struct StdoutEvaluationLogger {
    throttle: usize,
    timings: BTreeMap<String, Vec<f64>>,
    tally: ReadingTally,
    start_time: Instant,
}

impl StdoutEvaluationLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: BTreeMap::new(),
            tally: ReadingTally::default(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` before anything was scored.
    pub fn summary_string(&self) -> Option<String> {
        if self.tally.readings() == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let tally = &self.tally;
        let readings = tally.readings();
        let mut lines = vec![format!(
            "Evaluation summary ({readings} readings, {elapsed:.2}s):"
        )];

        for (stage, durations) in &self.timings {
            lines.push(format!(
                "  {stage:12}: avg {:7.3}ms  total {:8.1}ms",
                mean(durations),
                durations.iter().sum::<f64>()
            ));
        }

        let min = tally.accuracies.iter().copied().fold(f64::INFINITY, f64::min);
        let max = tally
            .accuracies
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        lines.push(format!(
            "  Accuracy: mean {:.1}%  min {min:.1}%  max {max:.1}%",
            tally.mean_accuracy()
        ));
        lines.push(format!(
            "  Words: {} read, {} misread",
            tally.target_words, tally.misread_words
        ));
        lines.push(format!(
            "  Perfect readings: {}/{readings}",
            tally.perfect_readings
        ));

        if elapsed > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} readings/s",
                readings as f64 / elapsed
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn tally(&self) -> &ReadingTally {
        &self.tally
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutEvaluationLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EvaluationLogger for StdoutEvaluationLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if total > 0 && (current % self.throttle == 0 || current == total) {
            log::info!(
                "Scored {current}/{total} readings, mean accuracy {:.1}%",
                self.tally.mean_accuracy()
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn scored(&mut self, result: &AlignmentResult) {
        self.tally.add(result);
        if result.misread_count() > 0 {
            log::debug!("Misread: {}", result.misread_words().join(", "));
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::domain::aligner::evaluate;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullEvaluationLogger;
        logger.progress(1, 10);
        logger.timing("align", 0.5);
        logger.scored(&evaluate("the cat", "the cat"));
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutEvaluationLogger::new(10);
        logger.timing("align", 2.0);
        logger.timing("align", 3.0);
        logger.timing("coach", 400.0);

        assert_eq!(logger.timings_for("align").unwrap(), &[2.0, 3.0]);
        assert_eq!(logger.timings_for("coach").unwrap(), &[400.0]);
        assert!(logger.timings_for("transcribe").is_none());
    }

    #[test]
    fn test_tally_counts_words_and_perfect_readings() {
        let mut logger = StdoutEvaluationLogger::new(10);
        logger.scored(&evaluate("the cat sat", "the cat sat"));
        logger.scored(&evaluate("the cat sat down", "the cat down"));
        logger.scored(&evaluate("", "anything"));

        let tally = logger.tally();
        assert_eq!(tally.readings(), 3);
        assert_eq!(tally.target_words, 7);
        assert_eq!(tally.misread_words, 1);
        assert_eq!(tally.perfect_readings, 1);
        assert_relative_eq!(tally.mean_accuracy(), 175.0 / 3.0);
    }

    #[test]
    fn test_summary_reports_accuracy_and_misreads() {
        let mut logger = StdoutEvaluationLogger::new(10);
        logger.timing("align", 1.0);
        logger.scored(&evaluate("the cat", "the dog"));
        logger.scored(&evaluate("the cat", "the cat"));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Evaluation summary (2 readings"));
        assert!(summary.contains("align"));
        assert!(summary.contains("Accuracy: mean 75.0%  min 50.0%  max 100.0%"));
        assert!(summary.contains("Words: 4 read, 1 misread"));
        assert!(summary.contains("Perfect readings: 1/2"));
    }

    #[test]
    fn test_summary_includes_throughput() {
        let mut logger = StdoutEvaluationLogger::new(10);
        logger.scored(&evaluate("the cat", "the cat"));
        std::thread::sleep(std::time::Duration::from_millis(2));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("readings/s"));
    }

    #[test]
    fn test_summary_is_none_until_something_is_scored() {
        let mut logger = StdoutEvaluationLogger::new(10);
        assert!(logger.summary_string().is_none());
        logger.timing("align", 1.0);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_default_throttle() {
        assert_eq!(StdoutEvaluationLogger::default().throttle, 100);
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        assert_eq!(StdoutEvaluationLogger::new(0).throttle, 1);
    }
}
