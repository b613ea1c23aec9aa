//! Signature matrix: a diagonal matrix whose entries are all `+1` or `-1`.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{
    check_right_operable, Band, Determinantable, Diagonal, EntryReadable, Invertible, Matrix, Orthogonal, Signature,
    Symmetric,
};
use crate::vector::Vector;

struct SignatureMatrixData {
    // `true` at index `i` means `A(i, i) == -1`.
    negated: Vec<bool>,
}

/// A diagonal matrix of `+1`/`-1` entries, used to record the sign flips
/// accumulated by pivoted symmetric factorizations.
#[derive(Clone)]
pub struct SignatureMatrix(Arc<SignatureMatrixData>);

impl SignatureMatrix {
    pub fn from_signs(negated: &[bool]) -> Result<SignatureMatrix> {
        if negated.is_empty() {
            return Err(LinalgError::IllegalArgument("signature matrix must have at least one entry".to_string()));
        }
        Ok(SignatureMatrix(Arc::new(SignatureMatrixData { negated: negated.to_vec() })))
    }

    pub fn identity(n: usize) -> Result<SignatureMatrix> {
        if n == 0 {
            return Err(LinalgError::IllegalArgument("identity dimension must be >= 1".to_string()));
        }
        Self::from_signs(&vec![false; n])
    }

    fn n(&self) -> usize {
        self.0.negated.len()
    }

    fn entry(&self, i: usize) -> f64 {
        if self.0.negated[i] {
            -1.0
        } else {
            1.0
        }
    }
}

impl Matrix for SignatureMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n()).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let out: Vec<f64> = (0..self.n()).map(|i| self.entry(i) * v.as_slice()[i]).collect();
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Symmetric for SignatureMatrix {}
impl Orthogonal for SignatureMatrix {}

impl Band for SignatureMatrix {
    fn band_dim(&self) -> BandDim {
        BandDim::new(self.n(), 0, 0).expect("already validated")
    }
}

impl Diagonal for SignatureMatrix {
    fn diagonal_value_at(&self, i: usize) -> Result<f64> {
        if i >= self.n() {
            return Err(LinalgError::IndexOutOfBounds { index: i, bound: self.n() });
        }
        Ok(self.entry(i))
    }
}

impl Signature for SignatureMatrix {
    fn is_odd_parity(&self) -> bool {
        self.0.negated.iter().filter(|&&b| b).count() % 2 == 1
    }
}

impl EntryReadable for SignatureMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        match self.band_dim().classify(i, j) {
            BandPosition::OutOfMatrix => Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.n() }),
            BandPosition::Diagonal => Ok(self.entry(i)),
            _ => Ok(0.0),
        }
    }

    fn entry_norm_max(&self) -> f64 {
        1.0
    }
}

impl Invertible for SignatureMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Determinantable for SignatureMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        DeterminantValue::new(if self.is_odd_parity() { -1 } else { 1 }, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operate_flips_negated_entries() {
        let s = SignatureMatrix::from_signs(&[true, false, true]).unwrap();
        let v = Vector::from_slice(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(s.operate(&v).unwrap().entry_as_array(), vec![-1.0, 1.0, -1.0]);
    }

    #[test]
    fn is_its_own_inverse() {
        let s = SignatureMatrix::from_signs(&[true, false]).unwrap();
        let v = Vector::from_slice(&[2.0, 3.0]).unwrap();
        let once = s.operate(&v).unwrap();
        let twice = s.inverse().operate(&once).unwrap();
        assert_eq!(twice.entry_as_array(), v.entry_as_array());
    }

    #[test]
    fn determinant_matches_parity() {
        let even = SignatureMatrix::from_signs(&[true, true]).unwrap();
        assert_eq!(even.determinant(), 1.0);
        let odd = SignatureMatrix::from_signs(&[true, false]).unwrap();
        assert_eq!(odd.determinant(), -1.0);
    }
}
