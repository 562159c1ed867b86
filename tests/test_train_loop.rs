// Tests for the training driver: apply cadence, plateau decay, progress
// reporting, checkpointing and the NaN guard.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use common::{filled, seeded, temp_path, uniform};
use ferrite_mlp::{
    evaluate, one_hot, train_loop, CheckpointFormat, LeakyRelu, Linear, LossPlateau, Network,
    NetworkError, Softmax, TrainConfig,
};

fn regression_data() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let inputs = vec![vec![1.0, 0.5], vec![0.2, 0.9], vec![0.7, 0.1]];
    let targets = vec![vec![0.5], vec![0.2], vec![0.4]];
    (inputs, targets)
}

#[test]
fn test_loss_decreases_over_epochs() {
    let (inputs, targets) = regression_data();
    let mut net: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 0.1);
    net.set_learning_rate(0.05).unwrap();
    let config = TrainConfig::new(50, inputs.len());
    let history = train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();

    assert_eq!(history.len(), 50);
    assert_eq!(history[0].epoch, 1);
    assert!(history[49].total_loss < history[0].total_loss);
    assert!(net.gradients().is_zero());
}

#[test]
fn test_apply_every_sample_differs_from_once_per_epoch() {
    let (inputs, targets) = regression_data();
    let mut per_sample: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 0.1);
    per_sample.set_learning_rate(0.1).unwrap();
    let mut per_epoch = per_sample.clone();

    let mut cfg = TrainConfig::new(1, 1);
    cfg.decay_on_plateau = false;
    train_loop(&mut per_sample, &inputs, &targets, &mut LossPlateau::new(), &cfg).unwrap();
    cfg.apply_every = inputs.len();
    train_loop(&mut per_epoch, &inputs, &targets, &mut LossPlateau::new(), &cfg).unwrap();

    assert_ne!(per_sample.biases(1), per_epoch.biases(1));
}

#[test]
fn test_stagnating_epoch_decays_learning_rate() {
    // A zero learning rate is not allowed, so use a step too small to move
    // the loss; equal epoch losses count as stagnation.
    let (inputs, targets) = regression_data();
    let mut net: Network<LeakyRelu, Linear> = filled(&[2, 1], LeakyRelu::default(), 0.0, 0.0);
    net.set_learning_rate(1e-300).unwrap();
    let config = TrainConfig::new(3, 1);
    let history = train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();

    assert!(!history[0].decayed);
    assert!(history[1].decayed);
    assert!(history[2].decayed);
    assert!(net.learning_rate() < 1e-301);
}

#[test]
fn test_plateau_carries_across_calls() {
    let (inputs, targets) = regression_data();
    let mut net: Network<LeakyRelu, Linear> = filled(&[2, 1], LeakyRelu::default(), 0.0, 0.0);
    net.set_learning_rate(1e-300).unwrap();
    let mut plateau = LossPlateau::new();
    plateau.observe(0.0);
    let history = train_loop(&mut net, &inputs, &targets, &mut plateau, &TrainConfig::new(1, 1)).unwrap();
    assert!(history[0].decayed);
}

#[test]
fn test_progress_channel_and_receiver_drop() {
    let (inputs, targets) = regression_data();
    let mut net: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 0.1);
    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(5, 2);
    config.progress_tx = Some(tx);
    drop(rx);
    let history = train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();
    assert_eq!(history.len(), 1);

    let (tx, rx) = mpsc::channel();
    config.progress_tx = Some(tx);
    train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();
    assert_eq!(rx.try_iter().count(), 5);
}

#[test]
fn test_stop_flag_prevents_training() {
    let (inputs, targets) = regression_data();
    let mut net: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 0.1);
    let mut config = TrainConfig::new(5, 1);
    config.stop_flag = Some(Arc::new(AtomicBool::new(true)));
    let history = train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();
    assert!(history.is_empty());
}

#[test]
fn test_checkpoint_written_each_epoch() {
    let (inputs, targets) = regression_data();
    let path = temp_path("train-checkpoint");
    let mut net: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 0.1);
    let config = TrainConfig::new(2, 3).with_checkpoint(&path, CheckpointFormat::Headered);
    train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();

    let loaded: Network<LeakyRelu, Linear> =
        Network::load(&path, net.topology().clone(), LeakyRelu::default()).unwrap();
    assert_eq!(loaded.weights(0), net.weights(0));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_diverging_training_reports_instability() {
    let inputs = vec![vec![1e200, 1e200]];
    let targets = vec![vec![0.0]];
    let mut net: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 1e200);
    let res = train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &TrainConfig::new(3, 1));
    assert!(matches!(res, Err(NetworkError::NumericalInstability)));
}

#[test]
fn test_mismatched_dataset_is_rejected() {
    let (inputs, _) = regression_data();
    let mut net: Network<LeakyRelu, Linear> = uniform(&[2, 3, 1], LeakyRelu::default(), 0.1);
    let res = train_loop(&mut net, &inputs, &[vec![0.0]], &mut LossPlateau::new(), &TrainConfig::new(1, 1));
    assert!(matches!(res, Err(NetworkError::InvalidShape { what: "targets", .. })));
    let res = train_loop(&mut net, &inputs, &inputs, &mut LossPlateau::new(), &TrainConfig::new(1, 0));
    assert!(matches!(res, Err(NetworkError::InvalidShape { what: "apply_every", .. })));
}

#[test]
fn test_classifier_learns_separable_classes() {
    let inputs = vec![
        vec![1.0, 0.0],
        vec![0.9, 0.2],
        vec![0.0, 1.0],
        vec![0.1, 0.8],
    ];
    let labels = vec![0, 0, 1, 1];
    let targets: Vec<Vec<f64>> = labels.iter().map(|&l| one_hot(l, 2)).collect();

    let mut net: Network<LeakyRelu, Softmax> = seeded(&[2, 4, 2], LeakyRelu::default(), 12);
    net.set_learning_rate(0.5).unwrap();
    let mut config = TrainConfig::new(300, 1);
    config.decay_on_plateau = false;
    train_loop(&mut net, &inputs, &targets, &mut LossPlateau::new(), &config).unwrap();

    assert_eq!(evaluate(&net, &inputs, &labels).unwrap(), 1.0);
}
