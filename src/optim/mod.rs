pub mod learning_rate;
pub mod plateau;
pub mod sgd;

pub use learning_rate::LearningRate;
pub use plateau::LossPlateau;
pub use sgd::Sgd;
