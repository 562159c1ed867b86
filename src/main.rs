// Small driver around the library: trains the network described by a JSON
// file (or the built-in XOR network) and checkpoints it next to its name.
//
//   RUST_LOG=info cargo run -- [network.json]
use std::process::ExitCode;

use ferrite_mlp::{
    evaluate, one_hot, train_loop, LearningRate, LossPlateau, Network, NetworkError, NetworkSpec,
    Result, Softmax, Topology, TrainConfig,
};
use log::{error, info};

fn xor_spec() -> Result<NetworkSpec> {
    let mut spec = NetworkSpec::new("xor", vec![2, 8, 2]);
    spec.learning_rate = LearningRate::new(0.05)?;
    Ok(spec)
}

/// The demo dataset is XOR, so both ends of the network must be 2 wide.
fn check_demo_topology(topology: &Topology) -> Result<()> {
    for (what, got) in [("demo input", topology.input_width()), ("demo output", topology.output_width())] {
        if got != 2 {
            error!("the demo dataset is XOR: the network needs 2 inputs and 2 outputs");
            return Err(NetworkError::InvalidShape { what, got, expected: 2 });
        }
    }
    Ok(())
}

fn run() -> Result<()> {
    let spec = match std::env::args().nth(1) {
        Some(path) => NetworkSpec::load_json(&path)?,
        None => xor_spec()?,
    };
    let topology = spec.topology()?;
    check_demo_topology(&topology)?;

    let checkpoint = spec.checkpoint_path();
    let mut network: Network<_, Softmax> = Network::load(&checkpoint, topology, spec.activation)?
        .with_learning_rate(spec.learning_rate);

    let inputs = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
    let labels = vec![0, 1, 1, 0];
    let targets: Vec<Vec<f64>> = labels.iter().map(|&l| one_hot(l, 2)).collect();

    let config = TrainConfig::new(2000, inputs.len()).with_checkpoint(&checkpoint, spec.checkpoint_format);
    let mut plateau = LossPlateau::new();
    let history = train_loop(&mut network, &inputs, &targets, &mut plateau, &config)?;

    let accuracy = evaluate(&network, &inputs, &labels)?;
    info!(
        "trained {} epochs, final mean loss {:.6}, accuracy {:.1}%",
        history.len(),
        history.last().map(|s| s.mean_loss).unwrap_or(f64::NAN),
        accuracy * 100.0
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
