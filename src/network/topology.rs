use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Ordered layer widths of a network, input first.
///
/// A topology always has at least two layers and no empty layer. It is
/// fixed when the network is built and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    widths: Vec<usize>,
}

impl Topology {
    pub fn new(widths: impl Into<Vec<usize>>) -> Result<Self> {
        let widths = widths.into();
        if widths.len() < 2 {
            return Err(NetworkError::InvalidTopology(format!(
                "need at least an input and an output layer, got {} layer(s)",
                widths.len()
            )));
        }
        if let Some(i) = widths.iter().position(|&w| w == 0) {
            return Err(NetworkError::InvalidTopology(format!("layer {i} has width 0")));
        }
        if widths.iter().any(|&w| u32::try_from(w).is_err()) {
            return Err(NetworkError::InvalidTopology("layer width exceeds u32::MAX".into()));
        }
        Ok(Topology { widths })
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Number of layers, counting input and output.
    pub fn num_layers(&self) -> usize {
        self.widths.len()
    }

    /// Number of weight matrices (one per consecutive pair of layers).
    pub fn num_transitions(&self) -> usize {
        self.widths.len() - 1
    }

    pub fn input_width(&self) -> usize {
        self.widths[0]
    }

    pub fn output_width(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    /// `(rows, cols)` of weight matrix `i`, i.e. `(width[i+1], width[i])`.
    pub fn weight_shape(&self, i: usize) -> (usize, usize) {
        (self.widths[i + 1], self.widths[i])
    }

    /// Total scalar parameters: every weight and every bias.
    pub fn parameter_count(&self) -> usize {
        self.widths
            .windows(2)
            .map(|pair| pair[1] * pair[0] + pair[1])
            .sum()
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = NetworkError;

    fn try_from(widths: Vec<usize>) -> Result<Self> {
        Topology::new(widths)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(topology: Topology) -> Self {
        topology.widths
    }
}
