pub mod lstm;

pub use self::lstm::Lstm;

/// Gradients handed back by a recurrent layer's backward step.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    /// Error with respect to the hidden output of the layer below at the same
    /// timestep. `None` when the layer has no lower-hidden input segment.
    pub lower: Option<Vec<f32>>,
    /// Error with respect to this layer's own hidden output at the previous
    /// (older) timestep. `None` at the oldest timestep of the window.
    pub recurrent: Option<Vec<f32>>,
}

/// A recurrent layer trained by truncated backpropagation through time.
pub trait Layer {
    fn input_len(&self) -> usize;

    fn output_len(&self) -> usize;

    /// Advances the layer one timestep, returning its new hidden output.
    fn forward(&mut self, inputs: &[f32]) -> &[f32];

    /// Back-propagates the error at timestep `step` of the current window.
    ///
    /// `errors` is the error with respect to this step's hidden output coming
    /// from the output projection and the layer above; `recurrent` is the
    /// error returned by the call for `step + 1`. Steps must be visited from
    /// `horizon - 1` down to 0, exactly once each per window.
    fn backward(
        &mut self,
        inputs: &[f32],
        errors: &[f32],
        recurrent: &[f32],
        step: usize,
    ) -> Gradients;
}
