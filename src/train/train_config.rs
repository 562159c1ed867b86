use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::network::checkpoint::CheckpointFormat;
use crate::train::epoch_stats::EpochStats;

/// Where `train_loop` writes a checkpoint after every epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointTarget {
    pub path: PathBuf,
    pub format: CheckpointFormat,
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training data
/// - `apply_every` — accumulated gradients are applied after this many
///                   samples, and always at the end of an epoch
/// - `decay_on_plateau` — divide the learning rate whenever an epoch's total
///                   loss is not lower than the best epoch so far
/// - `checkpoint`  — optional file written after every epoch
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the loop
///                   terminates early.
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the loop terminates after the current epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub apply_every: usize,
    pub decay_on_plateau: bool,
    pub checkpoint: Option<CheckpointTarget>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with plateau decay on, and no checkpoint,
    /// progress channel or stop flag.
    pub fn new(epochs: usize, apply_every: usize) -> Self {
        TrainConfig {
            epochs,
            apply_every,
            decay_on_plateau: true,
            checkpoint: None,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>, format: CheckpointFormat) -> Self {
        self.checkpoint = Some(CheckpointTarget { path: path.into(), format });
        self
    }
}
