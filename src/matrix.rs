use crate::utils::ZeroOut;

use rand::distributions::Distribution;
use rand::Rng;
use std::ops::AddAssign;

/// A dense weight matrix, one row per neuron.
#[derive(Clone, Debug, PartialEq)]
pub struct Mat {
    rows: usize,
    cols: usize,
    data: Vec<f32>, // row-major array
}

impl Mat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn random<D, R>(distribution: D, rng: &mut R, rows: usize, cols: usize) -> Self
    where
        D: Distribution<f32>,
        R: Rng,
    {
        let data = distribution.sample_iter(rng).take(rows * cols).collect();
        Mat { rows, cols, data }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Overwrites this matrix with the contents of `other`.
    pub fn copy_from(&mut self, other: &Mat) {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        self.data.copy_from_slice(&other.data);
    }

    /// Sets every entry of column `col` to `value`.
    pub fn fill_column(&mut self, col: usize, value: f32) {
        for row in self.data.chunks_mut(self.cols) {
            row[col] = value;
        }
    }
}

impl<'a> AddAssign<&'a Mat> for Mat {
    fn add_assign(&mut self, other: &Mat) {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        for (l, r) in self.data.iter_mut().zip(other.data.iter()) {
            *l += *r;
        }
    }
}

impl ZeroOut for Mat {
    fn zero_out(&mut self) {
        self.data.zero_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Uniform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Mat::random(Uniform::new(-0.2f32, 0.2), &mut rng, 5, 9);
        for r in 0..5 {
            assert!(m.row(r).iter().all(|&w| w >= -0.2 && w < 0.2));
        }
    }

    #[test]
    fn add_and_zero() {
        let mut a = Mat::zeros(2, 3);
        let mut b = Mat::zeros(2, 3);
        b.row_mut(1)[2] = 1.5;
        b.fill_column(0, -1.0);
        a += &b;
        a += &b;
        assert_eq!(a.row(0), &[-2.0, 0.0, 0.0]);
        assert_eq!(a.row(1), &[-2.0, 0.0, 3.0]);
        a.zero_out();
        assert_eq!(a, Mat::zeros(2, 3));
    }
}
