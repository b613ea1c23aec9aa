//! Lower-triangular matrix with an implicit unit diagonal, dense or
//! band-packed depending on construction.

use std::sync::Arc;

use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{
    check_left_operable, check_right_operable, create_transposed_of, Band, EntryReadable, Invertible,
    LowerUnitriangular, Matrix,
};
use crate::util::cache::LazyCache;
use crate::util::norm;
use crate::vector::{canonicalize, Vector};

struct UnitriangularMatrixData {
    n: usize,
    // `None` = dense (full strictly-lower storage); `Some(bw)` = packed to
    // `bw` subdiagonals, matching a banded LU's L factor.
    bandwidth: Option<usize>,
    // row-major packed strictly-lower entries; row `i` holds columns
    // `max(0, i - bw) .. i` (dense case: `bw = i`, i.e. all of `0..i`).
    values: Vec<f64>,
    transpose: LazyCache<Arc<dyn Matrix>>,
    norm_max: LazyCache<f64>,
}

#[derive(Clone)]
pub struct UnitriangularMatrix(Arc<UnitriangularMatrixData>);

impl UnitriangularMatrix {
    fn row_span(&self, i: usize) -> (usize, usize) {
        match self.0.bandwidth {
            Some(bw) => (i.saturating_sub(bw), i),
            None => (0, i),
        }
    }

    fn row_offset(&self, i: usize) -> usize {
        match self.0.bandwidth {
            Some(bw) => {
                // every row but the first `bw` holds exactly `bw` entries
                let full_rows = i.saturating_sub(bw);
                let ramp: usize = (0..i.min(bw)).sum();
                full_rows * bw + ramp
            }
            None => i * (i - 1) / 2,
        }
    }

    fn raw_value_at(&self, i: usize, j: usize) -> f64 {
        let (lo, hi) = self.row_span(i);
        if j < lo || j >= hi {
            if i == j {
                1.0
            } else {
                0.0
            }
        } else {
            self.0.values[self.row_offset(i) + (j - lo)]
        }
    }

    /// Dense strictly-lower storage, implicit unit diagonal.
    pub fn from_strictly_lower(n: usize, entries: impl Fn(usize, usize) -> f64) -> Result<UnitriangularMatrix> {
        if n == 0 {
            return Err(LinalgError::IllegalArgument("dimension must be >= 1".to_string()));
        }
        let mut values = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in 0..i {
                values.push(canonicalize(entries(i, j)));
            }
        }
        Ok(UnitriangularMatrix(Arc::new(UnitriangularMatrixData {
            n,
            bandwidth: None,
            values,
            transpose: LazyCache::new(),
            norm_max: LazyCache::new(),
        })))
    }

    /// Band-packed storage for a unitriangular `L` with `bandwidth`
    /// subdiagonals, as produced by a banded LU factorization.
    pub fn from_band(n: usize, bandwidth: usize, entries: impl Fn(usize, usize) -> f64) -> Result<UnitriangularMatrix> {
        if n == 0 {
            return Err(LinalgError::IllegalArgument("dimension must be >= 1".to_string()));
        }
        let mut values = Vec::new();
        for i in 0..n {
            let lo = i.saturating_sub(bandwidth);
            for j in lo..i {
                values.push(canonicalize(entries(i, j)));
            }
        }
        Ok(UnitriangularMatrix(Arc::new(UnitriangularMatrixData {
            n,
            bandwidth: Some(bandwidth),
            values,
            transpose: LazyCache::new(),
            norm_max: LazyCache::new(),
        })))
    }

    fn band_dim_of(&self) -> BandDim {
        let bw = self.0.bandwidth.unwrap_or(self.0.n.saturating_sub(1));
        BandDim::new(self.0.n, bw, 0).expect("already validated")
    }
}

impl Matrix for UnitriangularMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.0.n).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.0.n];
        for i in 0..self.0.n {
            let (lo, hi) = self.row_span(i);
            let mut acc = v.as_slice()[i];
            for j in lo..hi {
                acc += self.raw_value_at(i, j) * v.as_slice()[j];
            }
            out[i] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let mut out = v.as_slice().to_vec();
        for i in 0..self.0.n {
            let (lo, hi) = self.row_span(i);
            let vi = v.as_slice()[i];
            if vi == 0.0 {
                continue;
            }
            for j in lo..hi {
                out[j] = canonicalize(out[j] + self.raw_value_at(i, j) * vi);
            }
        }
        Vector::from_slice(&out)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        self.0
            .transpose
            .get_or_init(|| create_transposed_of(self))
            .clone()
    }
}

impl Band for UnitriangularMatrix {
    fn band_dim(&self) -> BandDim {
        self.band_dim_of()
    }
}

impl EntryReadable for UnitriangularMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        if i >= self.0.n || j >= self.0.n {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.0.n });
        }
        Ok(self.raw_value_at(i, j))
    }

    fn entry_norm_max(&self) -> f64 {
        *self.0.norm_max.get_or_init(|| norm::max_abs(&self.0.values).max(1.0))
    }
}

impl LowerUnitriangular for UnitriangularMatrix {}

impl Invertible for UnitriangularMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(TriangularInverse(self.clone()))
    }
}

/// `L^{-1}`, computed on the fly by forward/back substitution rather than
/// by materializing the (generally dense) inverse.
#[derive(Clone)]
struct TriangularInverse(UnitriangularMatrix);

impl Matrix for TriangularInverse {
    fn dim(&self) -> MatrixDim {
        self.0.dim()
    }

    /// Solves `L x = v` by forward substitution.
    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let n = self.0 .0.n;
        let mut x = vec![0.0; n];
        for i in 0..n {
            let (lo, hi) = self.0.row_span(i);
            let mut acc = v.as_slice()[i];
            for j in lo..hi {
                acc -= self.0.raw_value_at(i, j) * x[j];
            }
            x[i] = canonicalize(acc);
        }
        Vector::from_slice(&x)
    }

    /// Solves `L^T x = v` by back substitution.
    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let n = self.0 .0.n;
        let mut x = v.as_slice().to_vec();
        for i in (0..n).rev() {
            x[i] = canonicalize(x[i]);
            let (lo, hi) = self.0.row_span(i);
            let xi = x[i];
            if xi == 0.0 {
                continue;
            }
            for j in lo..hi {
                x[j] = canonicalize(x[j] - self.0.raw_value_at(i, j) * xi);
            }
        }
        Vector::from_slice(&x)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        create_transposed_of(self)
    }
}
