use crate::activation::Activation;
use crate::error::{NetworkError, Result};
use crate::network::gradients::Gradients;
use crate::network::network::Network;
use crate::network::output::OutputMode;

impl<A: Activation, O: OutputMode> Network<A, O> {
    /// Back-propagates one `(input, target)` pair into the network's own
    /// gradient buffer. Parameters are left untouched.
    ///
    /// Returns the squared output error when `compute_loss` is set.
    ///
    /// # Errors
    /// - `InvalidShape` if `input` or `target` has the wrong length.
    /// - `NumericalInstability` if the output error is not finite; nothing is
    ///   accumulated in that case.
    pub fn train_step(&mut self, input: &[f64], target: &[f64], compute_loss: bool) -> Result<Option<f64>> {
        let mut gradients = std::mem::take(&mut self.gradients);
        let result = self.backprop_into(input, target, &mut gradients, compute_loss);
        self.gradients = gradients;
        result
    }

    /// Same as [`train_step`](Network::train_step) but adds into a caller-owned
    /// buffer, so independent workers can each fill their own shard.
    pub fn backprop_into(
        &self,
        input: &[f64],
        target: &[f64],
        gradients: &mut Gradients,
        compute_loss: bool,
    ) -> Result<Option<f64>> {
        let expected = self.topology().output_width();
        if target.len() != expected {
            return Err(NetworkError::InvalidShape { what: "target", got: target.len(), expected });
        }
        if !gradients.matches(self.topology()) {
            return Err(NetworkError::InvalidShape {
                what: "gradient layers",
                got: gradients.layers().count(),
                expected: self.topology().num_transitions(),
            });
        }
        let trace = self.forward_trace(input)?;

        let (mut delta, loss) = O::output_gradient(trace.logits(), target);
        if !loss.is_finite() || delta.iter().any(|d| !d.is_finite()) {
            return Err(NetworkError::NumericalInstability);
        }

        // Walk the transitions from the output back to the input.
        let last = self.weights.len() - 1;
        gradients.accumulate(last, &delta, &trace.activations[last]);
        for i in (0..last).rev() {
            let back = self.weights[i + 1].transpose_mul_vec(&delta);
            delta = trace.pre_activations[i]
                .iter()
                .zip(back)
                .map(|(&z, g)| self.activation().derivative(z) * g)
                .collect();
            gradients.accumulate(i, &delta, &trace.activations[i]);
        }

        Ok(compute_loss.then_some(loss))
    }
}
