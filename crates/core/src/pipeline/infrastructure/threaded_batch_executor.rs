use std::time::Instant;

use crate::pipeline::batch_executor::{BatchExecutor, EvaluationItem, EvaluationOutcome};
use crate::pipeline::evaluation_logger::EvaluationLogger;
use crate::reading::domain::aligner;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Evaluates a batch on a pool of worker threads.
///
/// Layout: `main [feed] → workers [align] → main [collect]`
///
/// Evaluations share no state, so workers never coordinate beyond the
/// channels. Outcomes are reordered to match the input.
pub struct ThreadedBatchExecutor {
    workers: usize,
    channel_capacity: usize,
}

struct Completed {
    index: usize,
    outcome: EvaluationOutcome,
    duration_ms: f64,
}

impl ThreadedBatchExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        Self::new(
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        )
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        items: Vec<EvaluationItem>,
        logger: &mut dyn EvaluationLogger,
    ) -> Result<Vec<EvaluationOutcome>, Box<dyn std::error::Error>> {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.workers.min(total);
        logger.info(&format!("Evaluating {total} readings on {workers} workers"));

        let (item_tx, item_rx) =
            crossbeam_channel::bounded::<(usize, EvaluationItem)>(self.channel_capacity);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<Completed>(self.channel_capacity);

        let handles: Vec<_> = (0..workers)
            .map(|_| spawn_worker(item_rx.clone(), done_tx.clone()))
            .collect();
        drop(item_rx);
        drop(done_tx);

        let feeder = std::thread::spawn(move || {
            for pair in items.into_iter().enumerate() {
                if item_tx.send(pair).is_err() {
                    break;
                }
            }
        });

        let mut slots: Vec<Option<EvaluationOutcome>> = vec![None; total];
        let mut completed = 0;
        for done in done_rx {
            logger.timing("align", done.duration_ms);
            logger.scored(&done.outcome.result);
            slots[done.index] = Some(done.outcome);
            completed += 1;
            logger.progress(completed, total);
        }

        feeder
            .join()
            .map_err(|_| "Batch feeder thread panicked")?;
        for handle in handles {
            handle
                .join()
                .map_err(|_| "Batch worker thread panicked")?;
        }

        let outcomes: Vec<EvaluationOutcome> = slots.into_iter().flatten().collect();
        if outcomes.len() != total {
            return Err(format!(
                "Batch incomplete: {} of {total} readings evaluated",
                outcomes.len()
            )
            .into());
        }

        logger.summary();
        Ok(outcomes)
    }
}

fn spawn_worker(
    item_rx: crossbeam_channel::Receiver<(usize, EvaluationItem)>,
    done_tx: crossbeam_channel::Sender<Completed>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, item) in item_rx {
            let start = Instant::now();
            let result = aligner::evaluate(&item.target, &item.transcript);
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

            let done = Completed {
                index,
                outcome: EvaluationOutcome {
                    id: item.id,
                    result,
                },
                duration_ms,
            };
            if done_tx.send(done).is_err() {
                break;
            }
        }
    })
}
