//! Sparse vector support: a capability trait plus the one concrete shape
//! this crate needs — a vector whose nonzero entries are confined to a
//! single contiguous run, the shape a Householder reflector's generating
//! vector takes once it is restricted to a band window (see
//! [`crate::solve::qr_band`]).

use crate::dim::VectorDim;
use crate::error::{LinalgError, Result};
use crate::vector::{canonicalize, Vector};

/// A vector most of whose entries are structurally zero. `dot` and
/// `to_vector` are the only operations a sparse-vector-backed Householder
/// reflector needs; both can be computed touching only the nonzero run.
pub trait SparseVector {
    fn dim(&self) -> VectorDim;

    /// `true` iff index `i` lies outside the nonzero run.
    fn is_structural_zero(&self, i: usize) -> bool;

    fn value_at(&self, i: usize) -> Result<f64>;

    /// Dot product against a dense vector, touching only the nonzero run.
    fn dot(&self, other: &Vector) -> Result<f64>;

    /// Materializes the full dense vector.
    fn to_vector(&self) -> Result<Vector>;
}

/// A vector of total dimension `n` whose nonzero entries occupy the
/// contiguous run `[start, start + values.len())`; everything outside
/// that run is zero.
#[derive(Clone)]
pub struct LocalSparseVector {
    n: usize,
    start: usize,
    values: Vec<f64>,
}

impl LocalSparseVector {
    pub fn new(n: usize, start: usize, values: &[f64]) -> Result<LocalSparseVector> {
        if start + values.len() > n {
            return Err(LinalgError::IllegalArgument(format!(
                "local run [{start}, {}) does not fit within dimension {n}",
                start + values.len()
            )));
        }
        VectorDim::new(n)?;
        Ok(LocalSparseVector {
            n,
            start,
            values: values.iter().map(|&x| canonicalize(x)).collect(),
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn local_values(&self) -> &[f64] {
        &self.values
    }
}

impl SparseVector for LocalSparseVector {
    fn dim(&self) -> VectorDim {
        VectorDim::new(self.n).expect("already validated")
    }

    fn is_structural_zero(&self, i: usize) -> bool {
        i < self.start || i >= self.start + self.values.len()
    }

    fn value_at(&self, i: usize) -> Result<f64> {
        if i >= self.n {
            return Err(LinalgError::IndexOutOfBounds { index: i, bound: self.n });
        }
        Ok(if self.is_structural_zero(i) {
            0.0
        } else {
            self.values[i - self.start]
        })
    }

    fn dot(&self, other: &Vector) -> Result<f64> {
        if other.dim().n() != self.n {
            return Err(LinalgError::format_mismatch(self.dim().to_string(), other.dim().to_string()));
        }
        let other_slice = other.entry_as_array();
        Ok(self
            .values
            .iter()
            .zip(other_slice[self.start..self.start + self.values.len()].iter())
            .map(|(&a, &b)| a * b)
            .sum())
    }

    fn to_vector(&self) -> Result<Vector> {
        let mut out = vec![0.0; self.n];
        out[self.start..self.start + self.values.len()].copy_from_slice(&self.values);
        Vector::from_slice(&out)
    }
}
