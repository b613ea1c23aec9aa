//! Diagonal matrix: `A(i, j) = 0` for `i != j`.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{check_right_operable, Band, Determinantable, Diagonal, EntryReadable, Invertible, Matrix, Symmetric};
use crate::util::norm;
use crate::vector::{canonicalize, Vector};

struct DiagonalMatrixData {
    values: Vec<f64>,
}

/// A diagonal matrix with entries `values[0], ..., values[n - 1]`.
#[derive(Clone)]
pub struct DiagonalMatrix(Arc<DiagonalMatrixData>);

impl DiagonalMatrix {
    pub fn from_slice(values: &[f64]) -> Result<DiagonalMatrix> {
        if values.is_empty() {
            return Err(LinalgError::IllegalArgument("diagonal matrix must have at least one entry".to_string()));
        }
        Ok(DiagonalMatrix(Arc::new(DiagonalMatrixData {
            values: values.iter().map(|&x| canonicalize(x)).collect(),
        })))
    }

    pub fn identity(n: usize) -> Result<DiagonalMatrix> {
        Self::from_slice(&vec![1.0; n.max(1)]).and_then(|m| {
            if n == 0 {
                Err(LinalgError::IllegalArgument("identity dimension must be >= 1".to_string()))
            } else {
                Ok(m)
            }
        })
    }

    fn n(&self) -> usize {
        self.0.values.len()
    }
}

impl Matrix for DiagonalMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n()).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let out: Vec<f64> = self
            .0
            .values
            .iter()
            .zip(v.as_slice())
            .map(|(&a, &b)| canonicalize(a * b))
            .collect();
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Symmetric for DiagonalMatrix {}

impl Band for DiagonalMatrix {
    fn band_dim(&self) -> BandDim {
        BandDim::new(self.n(), 0, 0).expect("already validated")
    }
}

impl Diagonal for DiagonalMatrix {
    fn diagonal_value_at(&self, i: usize) -> Result<f64> {
        self.0.values.get(i).copied().ok_or(LinalgError::IndexOutOfBounds { index: i, bound: self.n() })
    }
}

impl EntryReadable for DiagonalMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        match self.band_dim().classify(i, j) {
            BandPosition::OutOfMatrix => Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.n() }),
            BandPosition::Diagonal => Ok(self.0.values[i]),
            _ => Ok(0.0),
        }
    }

    fn entry_norm_max(&self) -> f64 {
        norm::max_abs(&self.0.values)
    }
}

impl Invertible for DiagonalMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        let inv: Vec<f64> = self.0.values.iter().map(|&x| if x == 0.0 { 0.0 } else { 1.0 / x }).collect();
        Arc::new(DiagonalMatrix::from_slice(&inv).expect("same length as self"))
    }
}

impl Determinantable for DiagonalMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        self.0.values.iter().map(|&x| DeterminantValue::of_scalar(x)).collect()
    }
}
