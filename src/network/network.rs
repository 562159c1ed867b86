use std::marker::PhantomData;

use log::debug;
use rand::Rng;

use crate::activation::{Activation, ActivationFunction};
use crate::error::{NetworkError, Result};
use crate::math::{vector, Matrix};
use crate::network::gradients::Gradients;
use crate::network::output::{OutputMode, Softmax};
use crate::network::spec::NetworkSpec;
use crate::network::topology::Topology;
use crate::optim::{LearningRate, Sgd};

/// Constant part of the initial weights and biases.
pub const INIT_OFFSET: f64 = 0.001;
/// Uniform noise in [-1, 1) is divided by this before being added to the offset.
pub const INIT_NOISE_SCALE: f64 = 1000.0;
/// Every output bias starts here so early outputs are not exact ties.
pub const INIT_OUTPUT_BIAS: f64 = 0.1;

/// Fully connected feed-forward network with a fixed topology.
///
/// `A` is the hidden-layer activation and `O` the output normalization.
/// Weight matrix `i` has shape `width[i+1] × width[i]`; bias vector `i` has
/// length `width[i+1]`. The network also owns one [`Gradients`] buffer that
/// [`train_step`](Network::train_step) adds into and
/// [`apply_accumulated`](Network::apply_accumulated) drains.
#[derive(Debug, Clone)]
pub struct Network<A = ActivationFunction, O = Softmax> {
    topology: Topology,
    activation: A,
    pub(crate) weights: Vec<Matrix>,
    pub(crate) biases: Vec<Vec<f64>>,
    pub(crate) gradients: Gradients,
    optimizer: Sgd,
    _output: PhantomData<fn() -> O>,
}

/// Every intermediate vector of one forward pass.
///
/// `pre_activations[i]` is `W_i · activations[i] + b_i`; `activations[0]` is
/// the input and `activations[i+1]` is the activated `pre_activations[i]`
/// for every hidden layer. The last entry of `pre_activations` holds the raw
/// output logits.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardTrace {
    pub pre_activations: Vec<Vec<f64>>,
    pub activations: Vec<Vec<f64>>,
}

impl ForwardTrace {
    pub fn logits(&self) -> &[f64] {
        self.pre_activations.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<A: Activation, O: OutputMode> Network<A, O> {
    /// Builds a freshly initialized network using the thread RNG.
    pub fn new(topology: Topology, activation: A) -> Self {
        Self::with_rng(topology, activation, &mut rand::thread_rng())
    }

    /// Builds a freshly initialized network drawing noise from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(topology: Topology, activation: A, rng: &mut R) -> Self {
        let (weights, mut biases): (Vec<Matrix>, Vec<Vec<f64>>) = (0..topology.num_transitions())
            .map(|i| {
                let (rows, cols) = topology.weight_shape(i);
                let w = Matrix::random(rows, cols, rng).map(|x| INIT_OFFSET + x / INIT_NOISE_SCALE);
                let b = (0..rows)
                    .map(|_| INIT_OFFSET + (rng.gen::<f64>() * 2.0 - 1.0) / INIT_NOISE_SCALE)
                    .collect();
                (w, b)
            })
            .unzip();
        if let Some(last) = biases.last_mut() {
            last.fill(INIT_OUTPUT_BIAS);
        }

        debug!(
            "initialized {} network {:?} with {} parameters",
            O::NAME,
            topology.widths(),
            topology.parameter_count()
        );
        Self::assemble(topology, activation, weights, biases)
    }

    /// Builds a network from explicit parameters, checking every shape.
    pub fn from_parameters(
        topology: Topology,
        activation: A,
        weights: Vec<Matrix>,
        biases: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let expected = topology.num_transitions();
        if weights.len() != expected {
            return Err(NetworkError::InvalidShape { what: "weight matrices", got: weights.len(), expected });
        }
        if biases.len() != expected {
            return Err(NetworkError::InvalidShape { what: "bias vectors", got: biases.len(), expected });
        }
        for (i, (w, b)) in weights.iter().zip(&biases).enumerate() {
            let (rows, cols) = topology.weight_shape(i);
            let ragged = w.data.len() != rows || w.data.iter().any(|row| row.len() != cols);
            if w.shape() != (rows, cols) || ragged {
                return Err(NetworkError::InvalidShape { what: "weights", got: w.len(), expected: rows * cols });
            }
            if b.len() != rows {
                return Err(NetworkError::InvalidShape { what: "biases", got: b.len(), expected: rows });
            }
        }
        Ok(Self::assemble(topology, activation, weights, biases))
    }

    fn assemble(topology: Topology, activation: A, weights: Vec<Matrix>, biases: Vec<Vec<f64>>) -> Self {
        let gradients = Gradients::zeros(&topology);
        Network {
            topology,
            activation,
            weights,
            biases,
            gradients,
            optimizer: Sgd::default(),
            _output: PhantomData,
        }
    }

    /// Replaces the learning rate and its decay policy.
    pub fn with_learning_rate(mut self, learning_rate: LearningRate) -> Self {
        self.optimizer.learning_rate = learning_rate;
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn activation(&self) -> &A {
        &self.activation
    }

    pub fn weights(&self, layer: usize) -> &Matrix {
        &self.weights[layer]
    }

    pub fn biases(&self, layer: usize) -> &[f64] {
        &self.biases[layer]
    }

    /// The gradients accumulated since the last application.
    pub fn gradients(&self) -> &Gradients {
        &self.gradients
    }

    pub(crate) fn check_input(&self, input: &[f64]) -> Result<()> {
        let expected = self.topology.input_width();
        if input.len() != expected {
            return Err(NetworkError::InvalidShape { what: "input", got: input.len(), expected });
        }
        Ok(())
    }

    fn affine(&self, layer: usize, x: &[f64]) -> Vec<f64> {
        let mut z = self.weights[layer].mul_vec(x);
        vector::add_assign(&mut z, &self.biases[layer]);
        z
    }

    /// Runs the layers and keeps every intermediate vector. The output
    /// normalization is not applied.
    pub fn forward_trace(&self, input: &[f64]) -> Result<ForwardTrace> {
        self.check_input(input)?;
        let last = self.weights.len() - 1;
        let mut activations = Vec::with_capacity(last + 1);
        let mut pre_activations = Vec::with_capacity(last + 1);
        activations.push(input.to_vec());
        for i in 0..last {
            let z = self.affine(i, &activations[i]);
            activations.push(z.iter().map(|&x| self.activation.activate(x)).collect());
            pre_activations.push(z);
        }
        pre_activations.push(self.affine(last, &activations[last]));
        Ok(ForwardTrace { pre_activations, activations })
    }

    /// Computes the network output for `input`.
    ///
    /// Hidden layers apply the activation; the last layer produces raw logits
    /// which the output mode then normalizes.
    pub fn infer(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        let last = self.weights.len() - 1;
        let mut current = input.to_vec();
        for i in 0..last {
            current = self.affine(i, &current);
            current.iter_mut().for_each(|x| *x = self.activation.activate(*x));
        }
        let mut output = self.affine(last, &current);
        O::normalize_inference(&mut output);
        Ok(output)
    }

    /// Adds a gradient shard computed elsewhere into this network's buffer.
    pub fn merge_gradients(&mut self, gradients: &Gradients) -> Result<()> {
        self.gradients.merge(gradients)
    }

    /// Applies `params += gradients * learning_rate` to every layer and
    /// resets the accumulated gradients to zero.
    pub fn apply_accumulated(&mut self) {
        self.optimizer.step(&mut self.weights, &mut self.biases, &self.gradients);
        self.gradients.reset();
        debug!("applied accumulated gradients at learning rate {:e}", self.learning_rate());
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate.value()
    }

    pub fn learning_rate_policy(&self) -> &LearningRate {
        &self.optimizer.learning_rate
    }

    pub fn set_learning_rate(&mut self, value: f64) -> Result<()> {
        self.optimizer.learning_rate.set(value)
    }

    /// Divides the learning rate by its decay factor (10 by default) and
    /// returns the new value.
    pub fn decay_learning_rate(&mut self) -> f64 {
        self.optimizer.learning_rate.decay()
    }
}

impl<O: OutputMode> Network<ActivationFunction, O> {
    /// Builds a fresh network from a config file's description.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Self> {
        spec.validate()?;
        let network = Self::new(spec.topology()?, spec.activation);
        Ok(network.with_learning_rate(spec.learning_rate))
    }
}
