use std::io;

/// Errors produced by the network engine.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// A vector or accumulator does not match the width the topology expects.
    #[error("shape mismatch for {what}: got {got}, expected {expected}")]
    InvalidShape {
        /// Human-readable context for the mismatch (e.g. "input", "target").
        what: &'static str,
        /// Observed length.
        got: usize,
        /// Expected length.
        expected: usize,
    },

    /// The layer widths cannot describe a network.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Learning rates, decay factors and floors must be finite and positive.
    #[error("invalid learning rate: {0}")]
    InvalidLearningRate(f64),

    /// A checkpoint's byte length does not match the topology it is loaded into.
    #[error("corrupt checkpoint: expected {expected} bytes, got {got}")]
    CorruptCheckpoint {
        /// Byte length implied by the topology.
        expected: usize,
        /// Byte length actually present.
        got: usize,
    },

    /// A headered checkpoint was written for a different topology.
    #[error("checkpoint topology {found:?} does not match network topology {expected:?}")]
    TopologyMismatch {
        /// Widths of the network being loaded into.
        expected: Vec<usize>,
        /// Widths recorded in the checkpoint header.
        found: Vec<usize>,
    },

    #[error("unsupported checkpoint version {0}")]
    UnsupportedCheckpointVersion(u32),

    /// The output error or loss became NaN or infinite.
    #[error("numerical instability: non-finite gradient or loss")]
    NumericalInstability,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
