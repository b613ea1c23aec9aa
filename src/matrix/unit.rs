//! The multiplicative identity matrix, represented without per-entry storage.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{
    check_right_operable, Band, Determinantable, Diagonal, EntryReadable, Invertible, Matrix, Orthogonal, Symmetric,
};
use crate::vector::Vector;

/// The `n x n` identity operator. Carries only its size — `operate` is a
/// defensive copy of the input, nothing else.
#[derive(Clone, Copy)]
pub struct UnitMatrix {
    n: usize,
}

impl UnitMatrix {
    pub fn new(n: usize) -> Result<UnitMatrix> {
        if n == 0 {
            return Err(LinalgError::IllegalArgument("identity dimension must be >= 1".to_string()));
        }
        Ok(UnitMatrix { n })
    }
}

impl Matrix for UnitMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        Ok(v.clone())
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(*self)
    }
}

impl Symmetric for UnitMatrix {}
impl Orthogonal for UnitMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(*self)
    }
}

impl Band for UnitMatrix {
    fn band_dim(&self) -> BandDim {
        BandDim::new(self.n, 0, 0).expect("already validated")
    }
}

impl Diagonal for UnitMatrix {
    fn diagonal_value_at(&self, i: usize) -> Result<f64> {
        if i >= self.n {
            return Err(LinalgError::IndexOutOfBounds { index: i, bound: self.n });
        }
        Ok(1.0)
    }
}

impl EntryReadable for UnitMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        match self.band_dim().classify(i, j) {
            BandPosition::OutOfMatrix => Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.n }),
            BandPosition::Diagonal => Ok(1.0),
            _ => Ok(0.0),
        }
    }

    fn entry_norm_max(&self) -> f64 {
        1.0
    }
}

impl Invertible for UnitMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(*self)
    }
}

impl Determinantable for UnitMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        DeterminantValue::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operate_is_passthrough() {
        let u = UnitMatrix::new(3).unwrap();
        let v = Vector::from_slice(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(u.operate(&v).unwrap().entry_as_array(), v.entry_as_array());
    }

    #[test]
    fn determinant_is_one() {
        assert_eq!(UnitMatrix::new(5).unwrap().determinant(), 1.0);
    }
}
