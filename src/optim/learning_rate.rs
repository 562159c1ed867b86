use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

pub const DEFAULT_LEARNING_RATE: f64 = 1e-4;
pub const DEFAULT_DECAY_FACTOR: f64 = 10.0;
pub const DEFAULT_FLOOR: f64 = f64::MIN_POSITIVE;

/// Step size applied to accumulated gradients, with its decay policy.
///
/// Each [`decay`](LearningRate::decay) divides the value by `decay_factor`
/// but never takes it below `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningRate {
    value: f64,
    decay_factor: f64,
    floor: f64,
}

fn check_positive(x: f64) -> Result<f64> {
    if x.is_finite() && x > 0.0 {
        Ok(x)
    } else {
        Err(NetworkError::InvalidLearningRate(x))
    }
}

impl LearningRate {
    pub fn new(value: f64) -> Result<Self> {
        Ok(LearningRate { value: check_positive(value)?, ..Default::default() })
    }

    /// Replaces the decay factor and floor. The factor must exceed 1 and the
    /// floor must not exceed the current value.
    pub fn with_decay(self, decay_factor: f64, floor: f64) -> Result<Self> {
        if !(decay_factor.is_finite() && decay_factor > 1.0) {
            return Err(NetworkError::InvalidLearningRate(decay_factor));
        }
        let floor = check_positive(floor)?;
        if floor > self.value {
            return Err(NetworkError::InvalidLearningRate(floor));
        }
        Ok(LearningRate { decay_factor, floor, ..self })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn set(&mut self, value: f64) -> Result<()> {
        self.value = check_positive(value)?;
        Ok(())
    }

    /// Divides the rate by the decay factor, clamped at the floor, and
    /// returns the new value. A rate already below the floor (via `set`)
    /// is left unchanged.
    pub fn decay(&mut self) -> f64 {
        self.value = (self.value / self.decay_factor).max(self.floor).min(self.value);
        info!("learning rate is now {:e}", self.value);
        self.value
    }

    /// Checks values that came from a config file.
    pub fn validate(&self) -> Result<()> {
        check_positive(self.value)?;
        self.with_decay(self.decay_factor, self.floor)?;
        Ok(())
    }
}

impl Default for LearningRate {
    fn default() -> Self {
        LearningRate {
            value: DEFAULT_LEARNING_RATE,
            decay_factor: DEFAULT_DECAY_FACTOR,
            floor: DEFAULT_FLOOR,
        }
    }
}
