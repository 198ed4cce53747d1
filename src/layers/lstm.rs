use crate::activator::Activator;
use crate::layers::{self, Gradients};
use crate::matrix::Mat;
use crate::utils::{add_scaled, dot, ZeroOut};
use crate::ALPHABET;

use itertools::multizip;
use rand::distributions::Uniform;
use rand::Rng;

/// One value per gate of a cell bank.
#[derive(Clone, Debug, PartialEq)]
pub struct Gates<T> {
    pub forget: T,
    pub node: T,
    pub input: T,
    pub output: T,
}

impl<T> Gates<T> {
    fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut() -> T,
    {
        Gates {
            forget: f(),
            node: f(),
            input: f(),
            output: f(),
        }
    }
}

impl<T: ZeroOut> ZeroOut for Gates<T> {
    fn zero_out(&mut self) {
        self.forget.zero_out();
        self.node.zero_out();
        self.input.zero_out();
        self.output.zero_out();
    }
}

impl<'a> std::ops::AddAssign<&'a Gates<Mat>> for Gates<Mat> {
    fn add_assign(&mut self, other: &Gates<Mat>) {
        self.forget += &other.forget;
        self.node += &other.node;
        self.input += &other.input;
        self.output += &other.output;
    }
}

/// Activations recorded by one forward step, consumed by the backward step
/// for the same timestep.
#[derive(Clone, Debug)]
struct Snapshot {
    /// Cell state before the step's update.
    last_state: Vec<f32>,
    gates: Gates<Vec<f32>>,
    tanh_state: Vec<f32>,
}

impl Snapshot {
    fn new(cells: usize) -> Self {
        Snapshot {
            last_state: vec![0.0; cells],
            gates: Gates::from_fn(|| vec![0.0; cells]),
            tanh_state: vec![0.0; cells],
        }
    }
}

/// A bank of LSTM cells with a horizon-long ring of activation snapshots.
///
/// Inputs are laid out as a one-hot byte, this layer's previous hidden
/// output, optionally the hidden output of the layer below, and a trailing
/// bias entry fixed at 1.
#[derive(Clone, Debug)]
pub struct Lstm {
    weights: Gates<Mat>,
    /// Weight changes pending until the end of the current window.
    updates: Gates<Mat>,
    history: Vec<Snapshot>,
    state: Vec<f32>,
    hidden: Vec<f32>,
    learning_rate: f32,
    /// Ring slot the next forward step writes.
    epoch: usize,
}

impl Lstm {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `inputs` - the length of the feature vector, bias included.
    ///  * `cells` - the number of cells, and so the hidden width.
    ///  * `horizon` - the number of timesteps in a training window.
    ///  * `learning_rate` - scale applied to every accumulated gradient.
    pub fn new<R: Rng>(
        inputs: usize,
        cells: usize,
        horizon: usize,
        learning_rate: f32,
        rng: &mut R,
    ) -> Self {
        let init = Uniform::new(-0.2f32, 0.2);
        let mut weights = Gates::from_fn(|| Mat::random(&init, &mut *rng, cells, inputs));
        // Start out biased toward remembering.
        weights.forget.fill_column(inputs - 1, 1.0);
        Lstm {
            weights,
            updates: Gates::from_fn(|| Mat::zeros(cells, inputs)),
            history: vec![Snapshot::new(cells); horizon],
            state: vec![0.0; cells],
            hidden: vec![0.0; cells],
            learning_rate,
            epoch: 0,
        }
    }

    /// Returns the number of timesteps in a training window.
    pub fn horizon(&self) -> usize {
        self.history.len()
    }

    #[cfg(test)]
    pub(crate) fn weights(&self) -> &Gates<Mat> {
        &self.weights
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut Gates<Mat> {
        &mut self.weights
    }

    /// Sums the gate errors back through the weight columns starting at
    /// `offset`, one output per cell-wide input segment entry.
    fn project(&self, errors: &Gates<Vec<f32>>, offset: usize) -> Vec<f32> {
        let cells = self.hidden.len();
        let mut projected = vec![0.0; cells];
        for i in 0..cells {
            let node = &self.weights.node.row(i)[offset..offset + cells];
            let input = &self.weights.input.row(i)[offset..offset + cells];
            let forget = &self.weights.forget.row(i)[offset..offset + cells];
            let output = &self.weights.output.row(i)[offset..offset + cells];
            for (p, n, g, f, o) in multizip((projected.iter_mut(), node, input, forget, output)) {
                *p += n * errors.node[i];
                *p += g * errors.input[i];
                *p += f * errors.forget[i];
                *p += o * errors.output[i];
            }
        }
        projected
    }
}

impl layers::Layer for Lstm {
    fn input_len(&self) -> usize {
        self.weights.forget.cols()
    }

    fn output_len(&self) -> usize {
        self.hidden.len()
    }

    fn forward(&mut self, inputs: &[f32]) -> &[f32] {
        assert_eq!(inputs.len(), self.input_len());
        let snapshot = &mut self.history[self.epoch];
        snapshot.last_state.copy_from_slice(&self.state);
        for i in 0..self.state.len() {
            let forget = Activator::Sigmoid.f(dot(inputs, self.weights.forget.row(i)));
            self.state[i] *= forget;
            let node = Activator::TanH.f(dot(inputs, self.weights.node.row(i)));
            let input = Activator::Sigmoid.f(dot(inputs, self.weights.input.row(i)));
            self.state[i] += node * input;
            let tanh_state = Activator::TanH.f(self.state[i]);
            let output = Activator::Sigmoid.f(dot(inputs, self.weights.output.row(i)));
            self.hidden[i] = output * tanh_state;

            snapshot.gates.forget[i] = forget;
            snapshot.gates.node[i] = node;
            snapshot.gates.input[i] = input;
            snapshot.gates.output[i] = output;
            snapshot.tanh_state[i] = tanh_state;
        }
        self.epoch = (self.epoch + 1) % self.history.len();
        &self.hidden
    }

    fn backward(
        &mut self,
        inputs: &[f32],
        errors: &[f32],
        recurrent: &[f32],
        step: usize,
    ) -> Gradients {
        let cells = self.output_len();
        let horizon = self.horizon();
        assert_eq!(inputs.len(), self.input_len());
        assert_eq!(errors.len(), cells);
        assert_eq!(recurrent.len(), cells);
        assert!(step < horizon);

        let snapshot = &self.history[step];
        let mut gate_errors = Gates::from_fn(|| vec![0.0; cells]);
        for i in 0..cells {
            let hidden_error = errors[i] + recurrent[i];
            let forget = snapshot.gates.forget[i];
            let node = snapshot.gates.node[i];
            let input = snapshot.gates.input[i];
            let output = snapshot.gates.output[i];
            let tanh_state = snapshot.tanh_state[i];

            gate_errors.output[i] =
                tanh_state * hidden_error * Activator::Sigmoid.fprime(output);
            let state_error = hidden_error * output * Activator::TanH.fprime(tanh_state);
            gate_errors.node[i] = state_error * input * Activator::TanH.fprime(node);
            gate_errors.input[i] = state_error * node * Activator::Sigmoid.fprime(input);
            gate_errors.forget[i] =
                state_error * snapshot.last_state[i] * Activator::Sigmoid.fprime(forget);
        }

        // Projections read the weights this window was predicted with.
        let lower = if inputs.len() > ALPHABET + cells + 1 {
            Some(self.project(&gate_errors, ALPHABET + cells))
        } else {
            None
        };
        let recurrent = if step > 0 {
            Some(self.project(&gate_errors, ALPHABET))
        } else {
            None
        };

        if step == horizon - 1 {
            self.updates.zero_out();
        }
        let rate = self.learning_rate;
        for i in 0..cells {
            add_scaled(self.updates.forget.row_mut(i), rate * gate_errors.forget[i], inputs);
            add_scaled(self.updates.node.row_mut(i), rate * gate_errors.node[i], inputs);
            add_scaled(self.updates.input.row_mut(i), rate * gate_errors.input[i], inputs);
            add_scaled(self.updates.output.row_mut(i), rate * gate_errors.output[i], inputs);
        }
        if step == 0 {
            self.weights += &self.updates;
        }

        Gradients { lower, recurrent }
    }
}
