// Shared fixtures for the integration tests.
#![allow(dead_code)]

use ferrite_mlp::{Activation, Matrix, Network, OutputMode, Topology};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Network whose every weight and bias equals `value`.
pub fn uniform<A: Activation, O: OutputMode>(widths: &[usize], activation: A, value: f64) -> Network<A, O> {
    filled(widths, activation, value, value)
}

// Network with constant weights and constant biases.
pub fn filled<A: Activation, O: OutputMode>(
    widths: &[usize],
    activation: A,
    weight: f64,
    bias: f64,
) -> Network<A, O> {
    let topology = Topology::new(widths.to_vec()).unwrap();
    let weights = (0..topology.num_transitions())
        .map(|i| {
            let (rows, cols) = topology.weight_shape(i);
            Matrix::filled(rows, cols, weight)
        })
        .collect();
    let biases = (0..topology.num_transitions())
        .map(|i| vec![bias; topology.weight_shape(i).0])
        .collect();
    Network::from_parameters(topology, activation, weights, biases).unwrap()
}

// Freshly initialized network with a fixed seed.
pub fn seeded<A: Activation, O: OutputMode>(widths: &[usize], activation: A, seed: u64) -> Network<A, O> {
    let topology = Topology::new(widths.to_vec()).unwrap();
    Network::with_rng(topology, activation, &mut StdRng::seed_from_u64(seed))
}

// Network with parameters drawn from U(-scale, scale), for gradient checks.
pub fn scrambled<A: Activation + Clone, O: OutputMode>(
    widths: &[usize],
    activation: A,
    scale: f64,
    seed: u64,
) -> Network<A, O> {
    let topology = Topology::new(widths.to_vec()).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let weights = (0..topology.num_transitions())
        .map(|i| {
            let (rows, cols) = topology.weight_shape(i);
            Matrix::random(rows, cols, &mut rng).map(|x| x * scale)
        })
        .collect();
    let biases = (0..topology.num_transitions())
        .map(|i| {
            let (rows, _) = topology.weight_shape(i);
            Matrix::random(1, rows, &mut rng).data.remove(0).into_iter().map(|x| x * scale).collect()
        })
        .collect();
    Network::from_parameters(topology, activation, weights, biases).unwrap()
}

// Unique path under the system temp dir.
pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("ferrite-mlp-{}-{}", std::process::id(), name))
}
