pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use epoch_stats::EpochStats;
pub use train_config::{CheckpointTarget, TrainConfig};
pub use loop_fn::{evaluate, train_loop};
