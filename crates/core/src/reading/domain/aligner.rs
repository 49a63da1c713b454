use super::alignment_result::{AlignmentResult, TargetWord};
use super::normalizer::normalize;
use super::token::Token;

/// Predecessor choice recorded for each cell of the edit table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Start,
    Match,
    Substitute,
    /// Target word with no transcript counterpart.
    Delete,
    /// Transcript word with no target counterpart.
    Insert,
}

/// Minimum-edit-distance table over normalized tokens.
///
/// Cell `(i, j)` holds the unit-cost edit distance between `target[..i]` and
/// `transcript[..j]` together with the step that produced it.
struct EditTable {
    cols: usize,
    costs: Vec<usize>,
    steps: Vec<Step>,
}

impl EditTable {
    fn build(target: &[Token], transcript: &[Token]) -> Self {
        let rows = target.len() + 1;
        let cols = transcript.len() + 1;
        let mut table = Self {
            cols,
            costs: vec![0; rows * cols],
            steps: vec![Step::Start; rows * cols],
        };

        for j in 1..cols {
            table.set(0, j, j, Step::Insert);
        }
        for i in 1..rows {
            table.set(i, 0, i, Step::Delete);
        }

        for i in 1..rows {
            for j in 1..cols {
                let diagonal = table.cost(i - 1, j - 1);
                if target[i - 1].matches(&transcript[j - 1]) {
                    table.set(i, j, diagonal, Step::Match);
                    continue;
                }

                let deletion = table.cost(i - 1, j);
                let insertion = table.cost(i, j - 1);

                // Ties resolve diagonal first, then deletion, then insertion.
                let (best, step) = if diagonal <= deletion && diagonal <= insertion {
                    (diagonal, Step::Substitute)
                } else if deletion <= insertion {
                    (deletion, Step::Delete)
                } else {
                    (insertion, Step::Insert)
                };
                table.set(i, j, best + 1, step);
            }
        }

        table
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    fn cost(&self, i: usize, j: usize) -> usize {
        self.costs[self.index(i, j)]
    }

    fn step(&self, i: usize, j: usize) -> Step {
        self.steps[self.index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, cost: usize, step: Step) {
        let idx = self.index(i, j);
        self.costs[idx] = cost;
        self.steps[idx] = step;
    }
}

/// Aligns a transcript against the target passage and labels every target
/// word as correct or misread.
///
/// Extra transcript words never add entries; a target word with no
/// transcript counterpart is marked misread, never dropped. The result
/// always holds exactly `target.len()` words, in target order.
pub fn align(target: &[Token], transcript: &[Token]) -> AlignmentResult {
    if target.is_empty() {
        return AlignmentResult::empty();
    }

    let table = EditTable::build(target, transcript);
    log::debug!(
        "Aligned {} target words against {} transcript words (distance {})",
        target.len(),
        transcript.len(),
        table.cost(target.len(), transcript.len())
    );

    let mut words = Vec::with_capacity(target.len());
    let (mut i, mut j) = (target.len(), transcript.len());
    while i > 0 || j > 0 {
        match table.step(i, j) {
            Step::Match => {
                words.push(TargetWord::correct(&target[i - 1].surface));
                i -= 1;
                j -= 1;
            }
            Step::Substitute => {
                words.push(TargetWord::misread(&target[i - 1].surface));
                i -= 1;
                j -= 1;
            }
            Step::Delete => {
                words.push(TargetWord::misread(&target[i - 1].surface));
                i -= 1;
            }
            Step::Insert => j -= 1,
            Step::Start => break,
        }
    }
    words.reverse();

    AlignmentResult::from_words(words)
}

/// Normalizes both texts and aligns them.
pub fn evaluate(target: &str, transcript: &str) -> AlignmentResult {
    align(&normalize(target), &normalize(transcript))
}
