use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::dataset::SampleSet;
use crate::error::{Error, Result};
use crate::network::NeuralNetwork;

/// Knobs for the training loop. The defaults are the values that reliably
/// train the digit task on ~300 fonts.
#[derive(Debug, Clone, Copy)]
pub struct TrainerConfig {
    /// Hard cap on epochs before giving up.
    pub max_epochs: u32,

    /// Epochs to run before the first convergence check. Checking every
    /// sample each epoch is expensive, and the early phase never passes.
    pub warmup_epochs: u32,

    /// Progress is logged every this many epochs; 0 disables the log.
    pub report_interval: u32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_epochs: 30_000,
            warmup_epochs: 16_000,
            report_interval: 20,
        }
    }
}

/// Handed to the progress callback once per epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: u32,
    pub max_epochs: u32,
    pub samples: usize,
}

/// How a training run ended. Running out of epochs is a reported outcome,
/// not an error: the caller decides whether to retry with different
/// hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingOutcome {
    /// Every sample's rounded prediction matched its label.
    Converged { epochs: u32 },
    MaxEpochsExhausted,
    /// The progress callback asked to stop between epochs.
    Cancelled { epochs: u32 },
}

/// One row of the per-sample accuracy report.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SampleReport {
    pub digit: u8,
    /// Rounded `10 * output`, unclamped so gross misses stay visible.
    pub predicted: i32,
    pub matched: bool,
}

/// Trains until every sample is classified correctly or the epoch cap runs
/// out.
///
/// Each epoch feeds every sample of every digit through one backpropagation
/// step with the target encoded as `digit / 10`. The progress callback runs
/// once per epoch; returning `false` cancels the run at the epoch boundary.
pub fn train(
    network: &mut NeuralNetwork,
    samples: &SampleSet,
    config: TrainerConfig,
    mut progress: impl FnMut(&EpochReport) -> bool,
) -> Result<TrainingOutcome> {
    if samples.is_empty() {
        Err(Error::EmptySampleSet)?;
    }

    info!(
        samples = samples.sample_count(),
        max_epochs = config.max_epochs,
        "training started"
    );

    for epoch in 1..=config.max_epochs {
        for (digit, features) in samples.samples() {
            let expected = [f64::from(digit) / 10.0];
            network.back_propagate(features, &expected)?;
        }

        if config.report_interval != 0 && epoch % config.report_interval == 0 {
            info!(epoch, "training progress");
        }

        let report = EpochReport {
            epoch,
            max_epochs: config.max_epochs,
            samples: samples.sample_count(),
        };
        if !progress(&report) {
            info!(epoch, "training cancelled");
            return Ok(TrainingOutcome::Cancelled { epochs: epoch });
        }

        if epoch > config.warmup_epochs && all_correct(network, samples)? {
            info!(epoch, "training complete, all samples recognised");
            return Ok(TrainingOutcome::Converged { epochs: epoch });
        }
    }

    info!(max_epochs = config.max_epochs, "epoch cap exhausted");
    Ok(TrainingOutcome::MaxEpochsExhausted)
}

/// Like [`train`], but persists the model to `path` as soon as the run
/// converges.
pub fn train_and_save(
    network: &mut NeuralNetwork,
    samples: &SampleSet,
    config: TrainerConfig,
    path: impl AsRef<Path>,
    progress: impl FnMut(&EpochReport) -> bool,
) -> Result<TrainingOutcome> {
    let outcome = train(network, samples, config, progress)?;

    if let TrainingOutcome::Converged { .. } = outcome {
        network.save(path)?;
    }

    Ok(outcome)
}

/// Final verification pass: one row per sample, in digit order.
pub fn accuracy_report(
    network: &NeuralNetwork,
    samples: &SampleSet,
) -> Result<Vec<SampleReport>> {
    samples
        .samples()
        .map(|(digit, features)| {
            let predicted = rounded_output(network, features)?;
            Ok(SampleReport {
                digit,
                predicted,
                matched: predicted == i32::from(digit),
            })
        })
        .collect()
}

fn all_correct(network: &NeuralNetwork, samples: &SampleSet) -> Result<bool> {
    for (digit, features) in samples.samples() {
        if rounded_output(network, features)? != i32::from(digit) {
            return Ok(false);
        }
    }

    Ok(true)
}

fn rounded_output(network: &NeuralNetwork, features: &[f64]) -> Result<i32> {
    let output = network.feed_forward(features)?;
    Ok((10.0 * output[0]).round() as i32)
}
