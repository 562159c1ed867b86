//! Final-layer normalization, chosen per network type.
//!
//! The mode is a type parameter of [`Network`](super::Network), so a network
//! either always normalizes its output or never does.
//!
//! Both probability modes back-propagate through a sum-normalized softmax.
//! They differ only in inference: [`Softmax`] divides by the sum of
//! exponentials, [`ReferenceSoftmax`] divides by their Euclidean norm, which
//! reproduces checkpoints trained with the historical engine bit for bit.

use crate::math::vector;

pub trait OutputMode {
    const NAME: &'static str;

    /// Turns raw logits into the vector returned by `infer`.
    fn normalize_inference(logits: &mut [f64]);

    /// Output-layer gradient for `target`, plus the squared error it came from.
    ///
    /// The gradient points in the direction that reduces the error, so it is
    /// added to the parameters when applied.
    fn output_gradient(logits: &[f64], target: &[f64]) -> (Vec<f64>, f64);
}

/// Raw linear output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linear;

/// Softmax normalized by the sum of exponentials on both paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Softmax;

/// Softmax normalized by the L2 norm at inference and by the sum in training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceSoftmax;

impl OutputMode for Linear {
    const NAME: &'static str = "linear";

    fn normalize_inference(_logits: &mut [f64]) {}

    fn output_gradient(logits: &[f64], target: &[f64]) -> (Vec<f64>, f64) {
        let delta: Vec<f64> = target.iter().zip(logits).map(|(t, z)| t - z).collect();
        let loss = vector::squared_norm(&delta);
        (delta, loss)
    }
}

impl OutputMode for Softmax {
    const NAME: &'static str = "softmax";

    fn normalize_inference(logits: &mut [f64]) {
        softmax_in_place(logits);
    }

    fn output_gradient(logits: &[f64], target: &[f64]) -> (Vec<f64>, f64) {
        softmax_gradient(logits, target)
    }
}

impl OutputMode for ReferenceSoftmax {
    const NAME: &'static str = "reference_softmax";

    fn normalize_inference(logits: &mut [f64]) {
        exp_shifted(logits);
        let norm = vector::squared_norm(logits).sqrt();
        logits.iter_mut().for_each(|x| *x /= norm);
    }

    fn output_gradient(logits: &[f64], target: &[f64]) -> (Vec<f64>, f64) {
        softmax_gradient(logits, target)
    }
}

/// Subtracts the maximum logit and exponentiates, so the largest entry is 1.
fn exp_shifted(logits: &mut [f64]) {
    let max = vector::max(logits);
    logits.iter_mut().for_each(|x| *x = (*x - max).exp());
}

pub fn softmax_in_place(logits: &mut [f64]) {
    exp_shifted(logits);
    let sum: f64 = logits.iter().sum();
    logits.iter_mut().for_each(|x| *x /= sum);
}

/// Jacobian-vector product of the softmax with `target - p`:
/// `p ⊙ (delta - p·delta)`.
fn softmax_gradient(logits: &[f64], target: &[f64]) -> (Vec<f64>, f64) {
    let mut p = logits.to_vec();
    softmax_in_place(&mut p);
    let delta: Vec<f64> = target.iter().zip(&p).map(|(t, p)| t - p).collect();
    let loss = vector::squared_norm(&delta);
    let projection = vector::dot(&p, &delta);
    let gradient = p.iter().zip(&delta).map(|(p, d)| p * (d - projection)).collect();
    (gradient, loss)
}
