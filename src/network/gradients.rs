use crate::error::{NetworkError, Result};
use crate::math::{vector, Matrix};
use crate::network::topology::Topology;

/// Summed gradients for every weight matrix and bias vector of a network.
///
/// Backpropagation only ever adds into these buffers; they return to zero
/// when applied. A `Gradients` value can live outside the network, which
/// lets several workers accumulate independently and merge afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradients {
    weights: Vec<Matrix>,
    biases: Vec<Vec<f64>>,
}

impl Gradients {
    pub fn zeros(topology: &Topology) -> Gradients {
        let (weights, biases) = (0..topology.num_transitions())
            .map(|i| {
                let (rows, cols) = topology.weight_shape(i);
                (Matrix::zeros(rows, cols), vec![0.0; rows])
            })
            .unzip();
        Gradients { weights, biases }
    }

    pub fn weights(&self, layer: usize) -> &Matrix {
        &self.weights[layer]
    }

    pub fn biases(&self, layer: usize) -> &[f64] {
        &self.biases[layer]
    }

    pub(crate) fn layers(&self) -> impl Iterator<Item = (&Matrix, &Vec<f64>)> {
        self.weights.iter().zip(&self.biases)
    }

    /// True when every accumulated value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.weights.iter().all(|w| w.data.iter().flatten().all(|&x| x == 0.0))
            && self.biases.iter().flatten().all(|&x| x == 0.0)
    }

    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|w| w.fill(0.0));
        self.biases.iter_mut().for_each(|b| b.fill(0.0));
    }

    /// Whether these buffers have the shapes `topology` implies.
    pub fn matches(&self, topology: &Topology) -> bool {
        self.weights.len() == topology.num_transitions()
            && self
                .weights
                .iter()
                .enumerate()
                .all(|(i, w)| w.shape() == topology.weight_shape(i))
            && self.biases.iter().zip(&self.weights).all(|(b, w)| b.len() == w.rows)
    }

    /// Adds another shard into this one.
    pub fn merge(&mut self, other: &Gradients) -> Result<()> {
        if self.weights.len() != other.weights.len() {
            return Err(NetworkError::InvalidShape {
                what: "gradient layers",
                got: other.weights.len(),
                expected: self.weights.len(),
            });
        }
        for (mine, theirs) in self.weights.iter().zip(&other.weights) {
            if mine.shape() != theirs.shape() {
                return Err(NetworkError::InvalidShape {
                    what: "gradient weights",
                    got: theirs.len(),
                    expected: mine.len(),
                });
            }
        }
        for (mine, theirs) in self.weights.iter_mut().zip(&other.weights) {
            mine.add_assign(theirs);
        }
        for (mine, theirs) in self.biases.iter_mut().zip(&other.biases) {
            vector::add_assign(mine, theirs);
        }
        Ok(())
    }

    /// `bias[layer] += delta`, `weights[layer] += delta ⊗ previous`.
    pub(crate) fn accumulate(&mut self, layer: usize, delta: &[f64], previous: &[f64]) {
        vector::add_assign(&mut self.biases[layer], delta);
        self.weights[layer].add_outer(delta, previous);
    }
}
