//! Dense symmetric matrix, packed upper-triangular.

use std::sync::Arc;

use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_right_operable, EntryReadable, Matrix, Symmetric};
use crate::util::cache::LazyCache;
use crate::util::norm;
use crate::vector::{canonicalize, Vector};

/// Row-major packed index of `(i, j)` with `i <= j` into an upper-triangular
/// array of a size-`n` symmetric matrix.
fn packed_index(n: usize, i: usize, j: usize) -> usize {
    i * n - i * (i + 1) / 2 + j
}

struct SymmetricMatrixData {
    n: usize,
    values: Vec<f64>,
    norm_max: LazyCache<f64>,
}

/// A dense symmetric matrix: `A(i, j) == A(j, i)` for all `i, j`.
#[derive(Clone)]
pub struct SymmetricMatrix(Arc<SymmetricMatrixData>);

impl SymmetricMatrix {
    fn raw_value_at(&self, i: usize, j: usize) -> f64 {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.0.values[packed_index(self.0.n, lo, hi)]
    }
}

impl Matrix for SymmetricMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.0.n).expect("symmetric dim already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let n = self.0.n;
        let mut out = vec![0.0; n];
        for i in 0..n {
            let mut acc = 0.0;
            for j in 0..n {
                acc += self.raw_value_at(i, j) * v.as_slice()[j];
            }
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

impl Symmetric for SymmetricMatrix {}

impl EntryReadable for SymmetricMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        if i >= self.0.n || j >= self.0.n {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.0.n });
        }
        Ok(self.raw_value_at(i, j))
    }

    fn entry_norm_max(&self) -> f64 {
        *self.0.norm_max.get_or_init(|| norm::max_abs(&self.0.values))
    }
}

impl SymmetricMatrix {
    /// `sum_i A(i, i)`.
    pub fn trace(&self) -> f64 {
        (0..self.0.n).map(|i| self.raw_value_at(i, i)).sum()
    }
}

/// Single-use builder for [`SymmetricMatrix`]. Every `set_value(i, j, x)`
/// implicitly fills both `(i, j)` and `(j, i)`.
pub struct SymmetricMatrixBuilder {
    n: usize,
    values: Vec<f64>,
    built: bool,
}

impl SymmetricMatrixBuilder {
    pub fn zero_builder(n: usize) -> Result<SymmetricMatrixBuilder> {
        let dim = MatrixDim::square(n)?;
        if !dim.is_accepted_for_dense_matrix() {
            return Err(LinalgError::ElementsTooMany { rows: n, cols: n });
        }
        Ok(SymmetricMatrixBuilder {
            n,
            values: vec![0.0; n * (n + 1) / 2],
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
        if i >= self.n || j >= self.n {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.n });
        }
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        let idx = packed_index(self.n, lo, hi);
        self.values[idx] = canonicalize(x);
        Ok(self)
    }

    pub fn build(&mut self) -> Result<SymmetricMatrix> {
        self.check_not_built()?;
        self.built = true;
        Ok(SymmetricMatrix(Arc::new(SymmetricMatrixData {
            n: self.n,
            values: std::mem::take(&mut self.values),
            norm_max: LazyCache::new(),
        })))
    }
}
