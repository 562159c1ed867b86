use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info};

use crate::activation::Activation;
use crate::error::{NetworkError, Result};
use crate::math::vector::argmax;
use crate::network::network::Network;
use crate::network::output::OutputMode;
use crate::optim::plateau::LossPlateau;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the stats of every
/// completed epoch.
///
/// Samples are presented in order. Gradients are applied every
/// `config.apply_every` samples and at the end of each epoch. `plateau`
/// carries the best epoch loss across calls, so a driver that alternates
/// training and evaluation keeps one `LossPlateau` for the whole run.
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// - `InvalidShape` if `inputs` and `targets` differ in length, any sample
///   has the wrong width, or `apply_every` is zero.
/// - `NumericalInstability` if an epoch's total loss is not finite.
/// - `Io` if a checkpoint cannot be written.
pub fn train_loop<A: Activation, O: OutputMode>(
    network: &mut Network<A, O>,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    plateau: &mut LossPlateau,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    if inputs.len() != targets.len() {
        return Err(NetworkError::InvalidShape { what: "targets", got: targets.len(), expected: inputs.len() });
    }
    if config.apply_every == 0 {
        return Err(NetworkError::InvalidShape { what: "apply_every", got: 0, expected: 1 });
    }

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();
        let total_loss = run_one_epoch(network, inputs, targets, config.apply_every)?;
        if !total_loss.is_finite() {
            return Err(NetworkError::NumericalInstability);
        }

        let decayed = config.decay_on_plateau && plateau.observe(total_loss);
        if decayed {
            network.decay_learning_rate();
        }

        if let Some(ref target) = config.checkpoint {
            network.save(&target.path, target.format)?;
        }

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            total_loss,
            mean_loss: total_loss / inputs.len().max(1) as f64,
            learning_rate: network.learning_rate(),
            decayed,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        info!(
            "epoch {}/{}: mean loss {:.6}, learning rate {:e}",
            stats.epoch, stats.total_epochs, stats.mean_loss, stats.learning_rate
        );
        history.push(stats.clone());

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    Ok(history)
}

/// Fraction of samples whose highest output matches the label.
pub fn evaluate<A: Activation, O: OutputMode>(
    network: &Network<A, O>,
    inputs: &[Vec<f64>],
    labels: &[usize],
) -> Result<f64> {
    if inputs.len() != labels.len() {
        return Err(NetworkError::InvalidShape { what: "labels", got: labels.len(), expected: inputs.len() });
    }
    if inputs.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (input, &label) in inputs.iter().zip(labels) {
        if argmax(&network.infer(input)?) == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / inputs.len() as f64)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// One pass over the data. Returns the summed squared error.
fn run_one_epoch<A: Activation, O: OutputMode>(
    network: &mut Network<A, O>,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    apply_every: usize,
) -> Result<f64> {
    let mut total_loss = 0.0;

    for (i, (input, target)) in inputs.iter().zip(targets).enumerate() {
        total_loss += network.train_step(input, target, true)?.unwrap_or(0.0);
        if (i + 1) % apply_every == 0 {
            network.apply_accumulated();
        }
    }
    network.apply_accumulated();

    debug!("epoch finished over {} samples", inputs.len());
    Ok(total_loss)
}
