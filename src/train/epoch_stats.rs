use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Sum of the squared output error over every sample.
    pub total_loss: f64,
    /// `total_loss` divided by the number of samples.
    pub mean_loss: f64,
    /// Learning rate in effect after this epoch's plateau check.
    pub learning_rate: f64,
    /// Whether this epoch's loss triggered a learning-rate decay.
    pub decayed: bool,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
