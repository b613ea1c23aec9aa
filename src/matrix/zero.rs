//! The additive identity matrix, represented without per-entry storage.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::Result;
use crate::matrix::{check_left_operable, check_right_operable, Determinantable, EntryReadable, Matrix};
use crate::vector::{Vector, VectorDim};

/// An `m x n` matrix with every entry `0`.
#[derive(Clone, Copy)]
pub struct ZeroMatrix {
    dim: MatrixDim,
}

impl ZeroMatrix {
    pub fn new(dim: MatrixDim) -> ZeroMatrix {
        ZeroMatrix { dim }
    }
}

impl Matrix for ZeroMatrix {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, v)?;
        Ok(Vector::zero(VectorDim::new(self.dim.rows()).expect("already validated")))
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim, v)?;
        Ok(Vector::zero(VectorDim::new(self.dim.cols()).expect("already validated")))
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(ZeroMatrix::new(self.dim.transposed()))
    }
}

impl EntryReadable for ZeroMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        if i >= self.dim.rows() || j >= self.dim.cols() {
            return Err(crate::error::LinalgError::IndexOutOfBounds {
                index: i.max(j),
                bound: self.dim.rows().max(self.dim.cols()),
            });
        }
        Ok(0.0)
    }

    fn entry_norm_max(&self) -> f64 {
        0.0
    }
}

impl Determinantable for ZeroMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        DeterminantValue::singular()
    }
}
