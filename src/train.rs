use crate::checkpoint::{Progress, ProgressStore};
use crate::config::{LineSkip, TrainParams};
use crate::embeddings::{EmbeddingTable, VECTORS_FILE};
use crate::error::{EmbedError, Result};
use crate::vector::Vector;
use crate::vocab::{Corpus, Tokenizer, Vocabulary};

use ndarray::Zip;
use std::path::{Path, PathBuf};
use std::time::Instant;


/// Where a trainer is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainState {
    Idle,
    Running { epoch: usize, line: usize },
    Completed,
}

/// Counters of one `train` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrainSummary {
    pub resumed_from: Progress,
    pub epochs_completed: usize,
    pub lines_processed: usize,
    pub pair_updates: usize,
    pub checkpoints: usize,
}

pub struct Train {
    params: TrainParams,
    vectors_path: PathBuf,
    progress: ProgressStore,
    state: TrainState,
}

/// Moves both vectors by the same step, per component:
/// `g = t - c; t -= lr * g; c -= lr * g`.
fn pull_pair(target: &mut Vector, context: &mut Vector, learning_rate: f32) -> Result<()> {

    if target.len() != context.len() {
        return Err(EmbedError::LengthMismatch { left: target.len(), right: context.len() });
    }

    Zip::from(target.as_array_mut()).and(context.as_array_mut()).for_each(|t_k, c_k| {
        let gradient = *t_k - *c_k;
        *t_k -= learning_rate * gradient;
        *c_k -= learning_rate * gradient;
    });
    Ok(())
}

fn update_pair(table: &mut EmbeddingTable, target: usize, context: usize, learning_rate: f32) -> Result<()> {
    match table.pair_mut(target, context) {
        Some((t, c)) => pull_pair(t, c, learning_rate),
        // a word in its own window has a zero gradient
        None => Ok(()),
    }
}

/// Applies the windowed update rule to one corpus line and returns the number
/// of (target, context) pairs visited. Tokens without a vector are skipped.
pub fn train_line(table: &mut EmbeddingTable, line: &str, window_size: usize, learning_rate: f32) -> Result<usize> {

    let ids: Vec<Option<usize>> = Vocabulary::tokenize(line)
        .into_iter()
        .map(|word| table.index_of(word))
        .collect();
    let n = ids.len();

    let mut pairs = 0;
    for i in 0..n {
        let target = match ids[i] {
            Some(target) => target,
            None => continue,
        };

        // clamped to the line, so the band is lopsided near either end
        let start = i.saturating_sub(window_size);
        let end = i.saturating_add(window_size).min(n - 1);

        for j in start..=end {
            if j == i { continue }
            let context = match ids[j] {
                Some(context) => context,
                None => continue,
            };
            update_pair(table, target, context, learning_rate)?;
            pairs += 1;
        }
    }

    Ok(pairs)
}

impl Train {

    /// Vectors and progress records are kept in `output_dir`.
    pub fn new(params: TrainParams, output_dir: &Path) -> Train {
        Self {
            params,
            vectors_path: output_dir.join(VECTORS_FILE),
            progress: ProgressStore::in_dir(output_dir),
            state: TrainState::Idle,
        }
    }

    pub fn state(&self) -> TrainState {
        self.state
    }

    pub fn vectors_path(&self) -> &Path {
        &self.vectors_path
    }

    fn checkpoint(&self, table: &EmbeddingTable, progress: Progress) -> Result<()> {
        table.save(&self.vectors_path)?;
        self.progress.save(progress)
    }

    // number of leading lines to pass over in `epoch`
    fn lines_to_skip(&self, epoch: usize, resumed: Progress) -> usize {
        match self.params.line_skip {
            LineSkip::EveryEpoch => resumed.line,
            LineSkip::ResumedEpochOnly if epoch == resumed.epoch => resumed.line,
            LineSkip::ResumedEpochOnly => 0,
        }
    }

    /// Runs the remaining epochs over `corpus`, mutating `table` in place.
    ///
    /// Picks up from the stored progress records, checkpoints vectors and
    /// progress every `save_every` lines (and at the end of each epoch) and
    /// removes the progress records once the last epoch is done.
    pub fn train(&mut self, corpus: &Corpus, table: &mut EmbeddingTable) -> Result<TrainSummary> {

        let resumed = self.progress.load()?;
        if resumed != Progress::default() {
            log::info!("resuming from epoch {}, line {}", resumed.epoch, resumed.line);
        }

        let mut summary = TrainSummary { resumed_from: resumed, ..TrainSummary::default() };
        let epochs = self.params.epochs;

        for epoch in resumed.epoch..epochs {

            let timer = Instant::now();
            let skip = self.lines_to_skip(epoch, resumed);
            let mut pending = 0;
            let mut committed = skip;

            for (line_number, line) in corpus.lines()?.enumerate() {
                let line = line?;
                if line_number < skip { continue }

                self.state = TrainState::Running { epoch, line: line_number };
                summary.pair_updates += train_line(table, &line, self.params.window_size, self.params.learning_rate)?;
                summary.lines_processed += 1;
                pending += 1;
                committed = line_number + 1;

                if pending >= self.params.save_every {
                    self.checkpoint(table, Progress { epoch, line: committed })?;
                    summary.checkpoints += 1;
                    pending = 0;
                }
            }

            if pending > 0 {
                self.checkpoint(table, Progress { epoch, line: committed })?;
                summary.checkpoints += 1;
            }

            summary.epochs_completed += 1;
            log::info!("Epoch {}/{} completed, took {} ms", epoch + 1, epochs, timer.elapsed().as_millis());
        }

        self.progress.clear()?;
        self.state = TrainState::Completed;
        Ok(summary)
    }
}
