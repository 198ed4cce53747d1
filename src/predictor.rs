//! An online next-byte predictor built from stacked LSTM layers.
//!
//! Every byte of a stream is first predicted, then used as ground truth. The
//! output projection learns online after every byte, while the recurrent
//! layers learn by truncated backpropagation through time once per window of
//! `horizon` bytes.
//!
//! # Example
//!
//! Let's teach a predictor that a stream only ever contains one byte:
//!
//! ```
//! # use lstm_predictor::config::Config;
//! let mut predictor = Config::new()
//!     .cells(4)
//!     .layers(1)
//!     .horizon(4)
//!     .learning_rate(0.5)
//!     .build()
//!     .unwrap();
//!
//! let first = predictor.perceive(b'A')[b'A' as usize];
//! let mut last = first;
//! for _ in 0..200 {
//!     last = predictor.perceive(b'A')[b'A' as usize];
//! }
//! assert!(last > first);
//! ```
//!
//! Callers must keep the predictor in step with the stream: every
//! [`Predictor::perceive`] call must carry the byte that actually followed
//! the previous prediction. Out-of-step calls give undefined (though memory
//! safe) results.

use crate::activator::Activator;
use crate::config::Config;
use crate::error::Result;
use crate::layers::{Layer, Lstm};
use crate::matrix::Mat;
use crate::trainer::Model;
use crate::utils::{add_scaled, dot, ZeroOut};
use crate::ALPHABET;

use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Lowest probability handed to the entropy coder for any byte.
pub const PROBABILITY_FLOOR: f32 = 1e-6;

/// Everything recorded at one timestep of the training window.
#[derive(Clone, Debug)]
struct Frame {
    /// Feature vector fed to each layer.
    inputs: Vec<Vec<f32>>,
    /// Output projection the prediction was made with.
    weights: Mat,
    /// Raw sigmoid output per byte value, before flooring and normalizing.
    outputs: Vec<f32>,
    /// The byte that actually followed the prediction.
    byte: u8,
}

impl Frame {
    fn new(layers: usize, cells: usize, outputs: usize) -> Self {
        let inputs = (0..layers)
            .map(|layer| {
                let mut x = vec![0.0; feature_len(layer, cells)];
                if let Some(bias) = x.last_mut() {
                    *bias = 1.0;
                }
                x
            })
            .collect();
        Frame {
            inputs,
            weights: Mat::zeros(ALPHABET, outputs),
            outputs: vec![1.0 / ALPHABET as f32; ALPHABET],
            byte: 0,
        }
    }

    /// Adds the output projection's error, restricted to the hidden units
    /// starting at `offset`, into `errors`.
    fn output_error(&self, offset: usize, errors: &mut [f32]) {
        for (v, &output) in self.outputs.iter().enumerate() {
            let error = target(v, self.byte) - output;
            let row = &self.weights.row(v)[offset..offset + errors.len()];
            for (e, w) in errors.iter_mut().zip(row) {
                *e += w * error;
            }
        }
    }
}

/// Length of the feature vector for the layer at `layer`: one-hot byte, own
/// hidden, the lower layer's hidden when there is one, and bias.
fn feature_len(layer: usize, cells: usize) -> usize {
    let lower = if layer > 0 { cells } else { 0 };
    ALPHABET + cells + lower + 1
}

fn target(value: usize, byte: u8) -> f32 {
    if value == byte as usize {
        1.0
    } else {
        0.0
    }
}

/// A stack of LSTM layers feeding a per-byte sigmoid projection.
#[derive(Clone, Debug)]
pub struct Predictor {
    /// Bottom (closest to the raw byte) to top.
    layers: Vec<Lstm>,
    /// Live output projection, one row per byte value.
    output: Mat,
    /// Ring of per-timestep records, one per window position.
    frames: Vec<Frame>,
    /// Hidden output of every layer, concatenated, followed by a bias of 1.
    hidden: Vec<f32>,
    probs: Vec<f32>,
    cells: usize,
    learning_rate: f32,
    /// Ring slot the next prediction writes.
    epoch: usize,
    /// Whether every ring slot holds a real prediction.
    filled: bool,
    sweeps: u64,
}

impl Predictor {
    /// Creates an untrained predictor, validating `config` first.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let cells = config.cells;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let layers = (0..config.layers)
            .map(|layer| {
                Lstm::new(
                    feature_len(layer, cells),
                    cells,
                    config.horizon,
                    config.learning_rate,
                    &mut rng,
                )
            })
            .collect();
        let outputs = cells * config.layers + 1;
        let output = Mat::random(Uniform::new(-0.2f32, 0.2), &mut rng, ALPHABET, outputs);

        let mut hidden = vec![0.0; outputs];
        hidden[outputs - 1] = 1.0;
        Ok(Predictor {
            layers,
            output,
            frames: vec![Frame::new(config.layers, cells, outputs); config.horizon],
            hidden,
            probs: vec![1.0 / ALPHABET as f32; ALPHABET],
            cells,
            learning_rate: config.learning_rate,
            epoch: 0,
            filled: false,
            sweeps: 0,
        })
    }

    /// Returns the number of cells in each layer.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Returns the number of stacked layers.
    pub fn layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the training window length.
    pub fn horizon(&self) -> usize {
        self.frames.len()
    }

    /// Returns the ring slot the next prediction will occupy.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Returns how many training sweeps have run so far.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Feeds `byte` forward and returns the distribution of the byte after
    /// it, without learning anything.
    ///
    /// The distribution has 256 entries, each at least
    /// [`PROBABILITY_FLOOR`] before normalization, summing to 1.
    pub fn predict(&mut self, byte: u8) -> &[f32] {
        let cells = self.cells;
        let epoch = self.epoch;
        let top = self.layers.len() - 1;
        let inputs = &mut self.frames[epoch].inputs;
        for (l, layer) in self.layers.iter_mut().enumerate() {
            let own = l * cells..(l + 1) * cells;
            {
                let x = &mut inputs[l];
                x[..ALPHABET].zero_out();
                x[byte as usize] = 1.0;
                x[ALPHABET..ALPHABET + cells].copy_from_slice(&self.hidden[own.clone()]);
            }
            let hidden = layer.forward(&inputs[l]);
            self.hidden[own].copy_from_slice(hidden);
            if l < top {
                inputs[l + 1][ALPHABET + cells..ALPHABET + 2 * cells].copy_from_slice(hidden);
            }
        }

        let frame = &mut self.frames[epoch];
        frame.weights.copy_from(&self.output);
        for (v, output) in frame.outputs.iter_mut().enumerate() {
            *output = Activator::Sigmoid.f(dot(&self.hidden, self.output.row(v)));
        }
        normalize(&frame.outputs, &mut self.probs);

        self.epoch = (epoch + 1) % self.frames.len();
        if self.epoch == 0 {
            self.filled = true;
        }
        &self.probs
    }

    /// Learns from `byte`, the byte that followed the previous prediction,
    /// then predicts the byte after it.
    ///
    /// The output projection is updated on every call. When the window has
    /// just filled, the recurrent layers are trained over it first.
    pub fn perceive(&mut self, byte: u8) -> &[f32] {
        let horizon = self.frames.len();
        let last = (self.epoch + horizon - 1) % horizon;
        self.frames[last].byte = byte;
        if self.epoch == 0 && self.filled {
            self.sweep();
        }

        let outputs = &self.frames[last].outputs;
        for (v, &output) in outputs.iter().enumerate() {
            let error = target(v, byte) - output;
            add_scaled(self.output.row_mut(v), self.learning_rate * error, &self.hidden);
        }
        self.predict(byte)
    }

    /// Runs truncated backpropagation through time over the whole window,
    /// newest timestep first and top layer first.
    fn sweep(&mut self) {
        let cells = self.cells;
        let horizon = self.frames.len();
        let mut recurrent = vec![vec![0.0; cells]; self.layers.len()];
        for step in (0..horizon).rev() {
            let frame = &self.frames[step];
            let mut errors = vec![0.0; cells];
            for (l, layer) in self.layers.iter_mut().enumerate().rev() {
                frame.output_error(l * cells, &mut errors);
                let gradients = layer.backward(&frame.inputs[l], &errors, &recurrent[l], step);
                if let Some(previous) = gradients.recurrent {
                    recurrent[l] = previous;
                }
                errors = gradients.lower.unwrap_or_else(|| vec![0.0; cells]);
            }
        }
        self.sweeps += 1;
        debug!(sweep = self.sweeps, horizon, "trained recurrent layers");
    }
}

impl Model for Predictor {
    fn predict(&mut self, byte: u8) -> &[f32] {
        Predictor::predict(self, byte)
    }

    fn perceive(&mut self, byte: u8) -> &[f32] {
        Predictor::perceive(self, byte)
    }
}

/// Floors every raw output at [`PROBABILITY_FLOOR`] and rescales to sum to 1.
fn normalize(raw: &[f32], probs: &mut [f32]) {
    let mut sum = 0.0f64;
    for (p, &r) in probs.iter_mut().zip(raw) {
        *p = r.max(PROBABILITY_FLOOR);
        sum += f64::from(*p);
    }
    let sum = sum as f32;
    for p in probs {
        *p /= sum;
    }
}
