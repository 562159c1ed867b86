use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Leak slope used by [`LeakyRelu::default`].
pub const DEFAULT_LEAK: f64 = 0.01;

/// Element-wise nonlinearity applied by every hidden layer.
///
/// Implementations must be pure: `derivative(x)` is the slope of
/// `activate` at `x`, and neither may depend on anything but `x`.
pub trait Activation {
    fn activate(&self, x: f64) -> f64;
    fn derivative(&self, x: f64) -> f64;
}

/// Rectified linear unit. The slope at zero is taken as 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Relu;

impl Activation for Relu {
    fn activate(&self, x: f64) -> f64 {
        x.max(0.0)
    }

    fn derivative(&self, x: f64) -> f64 {
        if x >= 0.0 { 1.0 } else { 0.0 }
    }
}

/// Rectifier that keeps a small slope `alpha` for negative inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakyRelu {
    pub alpha: f64,
}

impl LeakyRelu {
    pub fn new(alpha: f64) -> LeakyRelu {
        LeakyRelu { alpha }
    }
}

impl Default for LeakyRelu {
    fn default() -> Self {
        LeakyRelu { alpha: DEFAULT_LEAK }
    }
}

impl Activation for LeakyRelu {
    fn activate(&self, x: f64) -> f64 {
        if x >= 0.0 { x } else { x * self.alpha }
    }

    fn derivative(&self, x: f64) -> f64 {
        if x >= 0.0 { 1.0 } else { self.alpha }
    }
}

/// Activation chosen at runtime, e.g. from a JSON [`NetworkSpec`](crate::network::NetworkSpec).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivationFunction {
    Relu,
    LeakyRelu { alpha: f64 },
    Sigmoid,
    Tanh,
    Identity,
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::LeakyRelu { alpha: DEFAULT_LEAK }
    }
}

impl Activation for ActivationFunction {
    fn activate(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Relu => Relu.activate(x),
            ActivationFunction::LeakyRelu { alpha } => LeakyRelu::new(*alpha).activate(x),
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Identity => x,
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Relu => Relu.derivative(x),
            ActivationFunction::LeakyRelu { alpha } => LeakyRelu::new(*alpha).derivative(x),
            ActivationFunction::Sigmoid => {
                let fx = self.activate(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::Identity => 1.0,
        }
    }
}
