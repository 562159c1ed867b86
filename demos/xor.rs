use ferrite_mlp::{LeakyRelu, LearningRate, Linear, Network, Topology};

fn main() -> ferrite_mlp::Result<()> {
    env_logger::init();

    let topology = Topology::new(vec![2, 8, 1])?;
    let mut network: Network<LeakyRelu, Linear> = Network::new(topology, LeakyRelu::default())
        .with_learning_rate(LearningRate::new(0.05)?);

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    let epochs = 10000;

    for epoch in 0..epochs {
        let mut loss = 0.0;
        for (input, expected) in inputs.iter().zip(&expected_outputs) {
            loss += network.train_step(input, expected, true)?.unwrap_or(0.0);
        }
        network.apply_accumulated();
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}");
        }
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.infer(input)?[0]);
    }
    Ok(())
}
