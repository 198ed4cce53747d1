//! Activation function types.

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types used by the recurrent gates and the output projection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Activator {
    /// Logistic sigmoid, with codomain (0, 1).
    Sigmoid,
    /// Hyperbolic tan function
    TanH,
}

impl Activator {
    /// Evaluates `f(x)` for the selected the activation function.
    pub fn f(&self, x: f32) -> f32 {
        match self {
            Activator::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activator::TanH => x.tanh(),
        }
    }

    /// Evaluates the derivative `f'(x)`, where `x = f^{-1}(y)`.
    ///
    /// Note that this function takes in the *output* of the activation
    /// function, rather than the input. The layers only keep activated
    /// values in their history, so this is all the backward pass has.
    pub fn fprime(&self, y: f32) -> f32 {
        match self {
            Activator::Sigmoid => y * (1.0 - y),
            Activator::TanH => 1.0 - y * y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_is_centered() {
        assert_relative_eq!(Activator::Sigmoid.f(0.0), 0.5);
        assert!(Activator::Sigmoid.f(30.0) <= 1.0);
        assert!(Activator::Sigmoid.f(-30.0) > 0.0);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-3;
        for &activator in &[Activator::Sigmoid, Activator::TanH] {
            for &x in &[-1.5f32, -0.2, 0.0, 0.7, 2.0] {
                let numeric =
                    (activator.f(x + h) - activator.f(x - h)) / (2.0 * h);
                let analytic = activator.fprime(activator.f(x));
                assert_relative_eq!(numeric, analytic, epsilon = 1e-3);
            }
        }
    }
}
