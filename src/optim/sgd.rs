use crate::math::{vector, Matrix};
use crate::network::gradients::Gradients;
use crate::optim::learning_rate::LearningRate;

/// Plain gradient step: `params += gradients * learning_rate`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sgd {
    pub learning_rate: LearningRate,
}

impl Sgd {
    pub fn new(learning_rate: LearningRate) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies accumulated gradients to every layer. Shapes must already agree.
    pub fn step(&self, weights: &mut [Matrix], biases: &mut [Vec<f64>], gradients: &Gradients) {
        let lr = self.learning_rate.value();
        for ((w, b), (w_grad, b_grad)) in weights.iter_mut().zip(biases.iter_mut()).zip(gradients.layers()) {
            w.scaled_add(lr, w_grad);
            vector::scaled_add(b, lr, b_grad);
        }
    }
}
