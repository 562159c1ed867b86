pub mod math;
pub mod activation;
pub mod error;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use math::vector::{argmax, one_hot};
pub use activation::{Activation, ActivationFunction, LeakyRelu, Relu};
pub use error::{NetworkError, Result};
pub use network::{
    CheckpointFormat, ForwardTrace, Gradients, Linear, Network, NetworkSpec, OutputMode,
    ReferenceSoftmax, Softmax, Topology,
};
pub use optim::{LearningRate, LossPlateau};
pub use train::{evaluate, train_loop, EpochStats, TrainConfig};
