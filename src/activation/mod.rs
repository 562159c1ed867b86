pub mod activation;

pub use activation::{Activation, ActivationFunction, LeakyRelu, Relu, DEFAULT_LEAK};
