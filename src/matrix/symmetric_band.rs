//! Symmetric band matrix, packed as the lower half-band only.

use std::sync::Arc;

use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{check_right_operable, Band, EntryReadable, Matrix, Symmetric};
use crate::util::cache::LazyCache;
use crate::util::norm;
use crate::vector::{canonicalize, Vector};

struct SymmetricBandMatrixData {
    n: usize,
    bandwidth: usize,
    // row-major: row i holds `bandwidth + 1` slots for columns `i - bandwidth ..= i`.
    values: Vec<f64>,
    norm_max: LazyCache<f64>,
}

/// A symmetric matrix with nonzero entries confined to `bandwidth`
/// diagonals on either side of the main diagonal.
#[derive(Clone)]
pub struct SymmetricBandMatrix(Arc<SymmetricBandMatrixData>);

impl SymmetricBandMatrix {
    fn band(&self) -> BandDim {
        BandDim::new(self.0.n, self.0.bandwidth, self.0.bandwidth).expect("already validated")
    }

    fn slot(&self, i: usize, j: usize) -> Option<usize> {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        if hi - lo > self.0.bandwidth {
            None
        } else {
            Some(hi * (self.0.bandwidth + 1) + (self.0.bandwidth - (hi - lo)))
        }
    }

    fn raw_value_at(&self, i: usize, j: usize) -> f64 {
        match self.slot(i, j) {
            Some(idx) => self.0.values[idx],
            None => 0.0,
        }
    }
}

impl Matrix for SymmetricBandMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.0.n).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let n = self.0.n;
        let bw = self.0.bandwidth;
        let mut out = vec![0.0; n];
        for i in 0..n {
            let lo = i.saturating_sub(bw);
            let hi = (i + bw).min(n - 1);
            let acc: f64 = (lo..=hi).map(|j| self.raw_value_at(i, j) * v.as_slice()[j]).sum();
            out[i] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Symmetric for SymmetricBandMatrix {}

impl Band for SymmetricBandMatrix {
    fn band_dim(&self) -> BandDim {
        self.band()
    }
}

impl EntryReadable for SymmetricBandMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        match self.band().classify(i, j) {
            BandPosition::OutOfMatrix => Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.0.n }),
            _ => Ok(self.raw_value_at(i, j)),
        }
    }

    fn entry_norm_max(&self) -> f64 {
        *self.0.norm_max.get_or_init(|| norm::max_abs(&self.0.values))
    }
}

/// Single-use builder for [`SymmetricBandMatrix`]. `set_value(i, j, x)`
/// implicitly fills both `(i, j)` and `(j, i)`.
pub struct SymmetricBandMatrixBuilder {
    n: usize,
    bandwidth: usize,
    values: Vec<f64>,
    built: bool,
}

impl SymmetricBandMatrixBuilder {
    pub fn zero_builder(n: usize, bandwidth: usize) -> Result<SymmetricBandMatrixBuilder> {
        let band = BandDim::new(n, bandwidth, bandwidth)?;
        if !band.is_accepted_for_band_matrix() {
            return Err(LinalgError::ElementsTooMany { rows: n, cols: n });
        }
        Ok(SymmetricBandMatrixBuilder {
            n,
            bandwidth,
            values: vec![0.0; n * (bandwidth + 1)],
            built: false,
        })
    }

    fn check_not_built(&self) -> Result<()> {
        if self.built {
            Err(LinalgError::IllegalArgument("builder has already been built".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn set_value(&mut self, i: usize, j: usize, x: f64) -> Result<&mut Self> {
        self.check_not_built()?;
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        if hi >= self.n || hi - lo > self.bandwidth {
            return Err(LinalgError::IllegalArgument(format!(
                "({i}, {j}) lies outside bandwidth {}",
                self.bandwidth
            )));
        }
        let idx = hi * (self.bandwidth + 1) + (self.bandwidth - (hi - lo));
        self.values[idx] = canonicalize(x);
        Ok(self)
    }

    pub fn build(&mut self) -> Result<SymmetricBandMatrix> {
        self.check_not_built()?;
        self.built = true;
        Ok(SymmetricBandMatrix(Arc::new(SymmetricBandMatrixData {
            n: self.n,
            bandwidth: self.bandwidth,
            values: std::mem::take(&mut self.values),
            norm_max: LazyCache::new(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiag() -> SymmetricBandMatrix {
        let mut b = SymmetricBandMatrixBuilder::zero_builder(4, 1).unwrap();
        for i in 0..4 {
            b.set_value(i, i, 2.0).unwrap();
        }
        for i in 0..3 {
            b.set_value(i, i + 1, -1.0).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn symmetric_read_both_sides() {
        let m = tridiag();
        assert_eq!(m.value_at(0, 1).unwrap(), m.value_at(1, 0).unwrap());
    }

    #[test]
    fn operate_equals_operate_transpose() {
        let m = tridiag();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(
            m.operate(&v).unwrap().entry_as_array(),
            m.operate_transpose(&v).unwrap().entry_as_array()
        );
    }

    #[test]
    fn rejects_out_of_band_set() {
        let mut b = SymmetricBandMatrixBuilder::zero_builder(4, 1).unwrap();
        assert!(b.set_value(0, 3, 1.0).is_err());
    }
}
