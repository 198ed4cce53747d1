/// A trait to replace all elements in a container with zeros.
pub trait ZeroOut {
    fn zero_out(&mut self);
}

impl ZeroOut for f32 {
    fn zero_out(&mut self) {
        *self = 0.0;
    }
}

impl<T> ZeroOut for [T]
where
    T: ZeroOut,
{
    fn zero_out(&mut self) {
        for elem in self {
            elem.zero_out();
        }
    }
}

impl<T> ZeroOut for Vec<T>
where
    T: ZeroOut,
{
    fn zero_out(&mut self) {
        for elem in self {
            elem.zero_out();
        }
    }
}

/// Sums `a[i] * b[i]` strictly left to right.
///
/// The summation order is part of the model's numeric contract: two runs with
/// the same seed and input must agree bit for bit.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
}

/// Adds `scale * source` into `target`, element by element.
#[inline]
pub fn add_scaled(target: &mut [f32], scale: f32, source: &[f32]) {
    debug_assert_eq!(target.len(), source.len());
    for (t, s) in target.iter_mut().zip(source) {
        *t += scale * s;
    }
}
