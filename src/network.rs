use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::iter::zip;
use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::math::*;

/// Seed substituted when the caller passes `0`, so "no seed" still means a
/// fixed, reproducible network.
const DEFAULT_SEED: u64 = 0x00d1_617e;

const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// A digit rounded from the raw network output, plus the pre-rounding
/// scalar for confidence/debugging display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub digit: u8,
    pub raw: f64,
}

/// On-disk model layout. JSON keeps it self-describing, so shapes can be
/// validated against the declared topology on load.
#[derive(Serialize, Deserialize)]
struct ModelFile {
    topology: Vec<usize>,
    activations: Vec<Activation>,
    learning_rate: f64,
    weights: Array3D<f64>,
    biases: Array2D<f64>,
}

/// A feedforward network trained with single-sample backpropagation.
///
/// For the digit task the topology is `[196, ..hidden.., 1]`: the input is a
/// 14x14 feature vector and the output encodes the digit as `digit / 10`.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    /// Layer widths, input layer first.
    topology: Vec<usize>,

    /// One activation per layer transition (`topology.len() - 1` entries).
    activations: Vec<Activation>,

    /// `weights[l][to][from]`, one matrix per layer transition.
    weights: Array3D<f64>,

    /// `biases[l][to]`, one vector per layer transition.
    biases: Array2D<f64>,

    learning_rate: f64,
}

impl NeuralNetwork {
    /// Builds the network with seeded random parameters.
    ///
    /// The list `topology` contains the number of neurons in the respective
    /// layers; zero-width entries are dropped. `activations` supplies one
    /// function per layer transition -- extra entries are ignored (with a
    /// warning), missing entries are an error.
    ///
    /// Weights are drawn from a standard normal scaled by `1/sqrt(fan_in)`.
    /// With `zero_bias` set, biases start at zero instead of being sampled.
    pub fn new(
        seed: u64,
        topology: &[usize],
        activations: &[Activation],
        zero_bias: bool,
    ) -> Result<Self> {
        let topology: Vec<usize> = topology.iter().copied().filter(|size| *size > 0).collect();
        if topology.len() < 2 {
            Err(Error::InvalidTopology)?;
        }

        let transitions = topology.len() - 1;
        if activations.len() < transitions {
            Err(Error::MissingActivations {
                expected: transitions,
                actual: activations.len(),
            })?;
        }
        if activations.len() > transitions {
            warn!(
                configured = activations.len(),
                used = transitions,
                "ignoring extra activation entries"
            );
        }

        let seed = if seed == 0 { DEFAULT_SEED } else { seed };
        let mut rng = StdRng::seed_from_u64(seed);

        let mut weights = Array3D::with_capacity(transitions);
        let mut biases = Array2D::with_capacity(transitions);

        for (from, to) in zip(topology[..transitions].iter(), topology[1..].iter()) {
            let scale = 1.0 / (*from as f64).sqrt();
            weights.push(random_matrix(&mut rng, *to, *from, scale));
            biases.push(if zero_bias {
                vec![0.0; *to]
            } else {
                random_array(&mut rng, *to, 1.0)
            });
        }

        Ok(Self {
            topology,
            activations: activations[..transitions].to_vec(),
            weights,
            biases,
            learning_rate: DEFAULT_LEARNING_RATE,
        })
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    pub fn weights(&self) -> &Array3D<f64> {
        &self.weights
    }

    pub fn biases(&self) -> &Array2D<f64> {
        &self.biases
    }

    pub fn input_len(&self) -> usize {
        self.topology[0]
    }

    pub fn output_len(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Return the output of the network: `activation(W·x + b)` applied layer
    /// by layer. Does not mutate any parameters.
    pub fn feed_forward(&self, input: &[f64]) -> Result<Array1D<f64>> {
        if input.len() != self.input_len() {
            Err(Error::DimensionMismatch {
                expected: self.input_len(),
                actual: input.len(),
            })?;
        }

        let mut activation = input.to_vec();
        for ((w, b), f) in zip(zip(self.weights.iter(), self.biases.iter()), &self.activations) {
            activation = zip(mat_vec(w, &activation), b.iter())
                .map(|(z, b)| f.apply(z + b))
                .collect();
        }

        Ok(activation)
    }

    /// One online backpropagation step on a single sample.
    ///
    /// Runs a forward pass caching every layer's post-activation output,
    /// seeds the output delta with `(expected - actual)` scaled by the output
    /// activation's derivative, chains deltas backward through `Wᵀ·δ`, and
    /// nudges every weight and bias by `learning_rate` in the direction that
    /// reduces the squared error. The epoch structure around repeated calls
    /// belongs to the trainer.
    pub fn back_propagate(&mut self, input: &[f64], expected: &[f64]) -> Result<()> {
        if input.len() != self.input_len() {
            Err(Error::DimensionMismatch {
                expected: self.input_len(),
                actual: input.len(),
            })?;
        }
        if expected.len() != self.output_len() {
            Err(Error::DimensionMismatch {
                expected: self.output_len(),
                actual: expected.len(),
            })?;
        }

        // forward, keeping each layer's output for the backward pass
        let mut outputs: Array2D<f64> = vec![input.to_vec()];
        for ((w, b), f) in zip(zip(self.weights.iter(), self.biases.iter()), &self.activations) {
            let next = zip(mat_vec(w, outputs.last().unwrap()), b.iter())
                .map(|(z, b)| f.apply(z + b))
                .collect();
            outputs.push(next);
        }

        // output delta; derivatives come from the cached activations so the
        // backward pass stays consistent with the forward one
        let last_f = *self.activations.last().unwrap();
        let mut delta: Array1D<f64> = zip(expected.iter(), outputs.last().unwrap().iter())
            .map(|(e, a)| (e - a) * last_f.derivative_from_output(*a))
            .collect();

        for l in (0..self.weights.len()).rev() {
            // the layer below needs this layer's pre-update weights
            let next_delta = (l > 0).then(|| {
                let f = self.activations[l - 1];
                zip(mat_t_vec(&self.weights[l], &delta), outputs[l].iter())
                    .map(|(sum, a)| sum * f.derivative_from_output(*a))
                    .collect::<Array1D<f64>>()
            });

            let prev = &outputs[l];
            for (i, d) in delta.iter().enumerate() {
                let step = self.learning_rate * d;
                for (w, a) in zip(self.weights[l][i].iter_mut(), prev.iter()) {
                    *w += step * a;
                }
                self.biases[l][i] += step;
            }

            if let Some(next) = next_delta {
                delta = next;
            }
        }

        Ok(())
    }

    /// Feeds a feature vector forward and rounds `10 * output` to the
    /// nearest digit, clamped to 0-9.
    pub fn predict(&self, input: &[f64]) -> Result<Prediction> {
        let raw = self.feed_forward(input)?[0];
        let digit = (10.0 * raw).round().clamp(0.0, 9.0) as u8;

        Ok(Prediction { digit, raw })
    }

    /// Persists topology, activation selectors and all parameters as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = ModelFile {
            topology: self.topology.clone(),
            activations: self.activations.clone(),
            learning_rate: self.learning_rate,
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        };

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &file).map_err(|e| Error::Format(e.to_string()))
    }

    /// Restores a network saved with [`NeuralNetwork::save`], validating
    /// every parameter shape against the declared topology.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let file: ModelFile =
            serde_json::from_reader(reader).map_err(|e| Error::Format(e.to_string()))?;

        if file.topology.len() < 2 {
            Err(Error::Format("topology has fewer than two layers".into()))?;
        }

        let transitions = file.topology.len() - 1;
        for (name, len) in [
            ("activations", file.activations.len()),
            ("weights", file.weights.len()),
            ("biases", file.biases.len()),
        ] {
            if len != transitions {
                Err(Error::Format(format!(
                    "{name} has {len} entries, topology declares {transitions} transitions"
                )))?;
            }
        }

        for l in 0..transitions {
            let (from, to) = (file.topology[l], file.topology[l + 1]);

            if file.weights[l].len() != to || file.biases[l].len() != to {
                Err(Error::Format(format!(
                    "layer {l}: expected {to} rows/biases, got {} rows and {} biases",
                    file.weights[l].len(),
                    file.biases[l].len()
                )))?;
            }
            if let Some(row) = file.weights[l].iter().find(|row| row.len() != from) {
                Err(Error::Format(format!(
                    "layer {l}: weight row has {} columns, topology says {from}",
                    row.len()
                )))?;
            }
        }

        Ok(Self {
            topology: file.topology,
            activations: file.activations,
            weights: file.weights,
            biases: file.biases,
            learning_rate: file.learning_rate,
        })
    }
}
