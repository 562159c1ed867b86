use serde::{Serialize, Deserialize};
use crate::activation::ActivationFunction;
use crate::error::Result;
use crate::network::checkpoint::CheckpointFormat;
use crate::network::topology::Topology;
use crate::optim::LearningRate;

/// A serializable description of a network and how it is trained and saved.
///
/// Everything except `name` and `layers` falls back to the defaults:
/// leaky rectifier hidden layers, a learning rate of `1e-4` decayed tenfold,
/// and headered checkpoints.
///
/// ```json
/// {
///   "name": "mnist",
///   "layers": [784, 800, 10],
///   "activation": { "type": "leaky_relu", "alpha": 0.01 },
///   "learning_rate": { "value": 0.0001, "decay_factor": 10.0 },
///   "checkpoint_format": "legacy"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, used as the default checkpoint file stem.
    pub name: String,
    /// Layer widths, input first.
    pub layers: Vec<usize>,
    #[serde(default)]
    pub activation: ActivationFunction,
    #[serde(default)]
    pub learning_rate: LearningRate,
    #[serde(default)]
    pub checkpoint_format: CheckpointFormat,
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>, layers: Vec<usize>) -> NetworkSpec {
        NetworkSpec {
            name: name.into(),
            layers,
            activation: ActivationFunction::default(),
            learning_rate: LearningRate::default(),
            checkpoint_format: CheckpointFormat::default(),
        }
    }

    pub fn topology(&self) -> Result<Topology> {
        Topology::new(self.layers.clone())
    }

    /// Checks the topology and learning-rate values.
    pub fn validate(&self) -> Result<()> {
        self.topology()?;
        self.learning_rate.validate()
    }

    /// `<name>.weights`, the checkpoint path used when none is given.
    pub fn checkpoint_path(&self) -> String {
        format!("{}.weights", self.name)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
