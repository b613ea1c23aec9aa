//! Ordered product of orthogonal factors: itself orthogonal, with `det`
//! tracked directly rather than recomputed from the factors.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::Result;
use crate::matrix::{Determinantable, Matrix, Orthogonal};
use crate::matrix::product::MatrixProduct;
use crate::vector::Vector;

/// `Q_1 Q_2 ... Q_k`, where each `Q_i` is orthogonal. The caller supplies
/// the sign of the product's determinant up front (each orthogonal factor
/// contributes `+1` or `-1`, known at the point each is produced — a
/// Householder reflector is always `-1`, a permutation's sign comes from its
/// parity) rather than this type trying to recover it from the erased
/// factors.
#[derive(Clone)]
pub struct OrthogonalProduct {
    inner: MatrixProduct,
    sign: i32,
}

impl OrthogonalProduct {
    pub fn new(factors: Vec<Arc<dyn Matrix>>, sign: i32) -> Result<OrthogonalProduct> {
        debug_assert!(sign == 1 || sign == -1);
        Ok(OrthogonalProduct {
            inner: MatrixProduct::new(factors)?,
            sign,
        })
    }
}

impl Matrix for OrthogonalProduct {
    fn dim(&self) -> MatrixDim {
        self.inner.dim()
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        self.inner.operate(v)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.inner.operate_transpose(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(OrthogonalProduct {
            inner: MatrixProduct::new(vec![self.inner.transpose()]).expect("single factor always chains"),
            sign: self.sign,
        })
    }
}

impl Orthogonal for OrthogonalProduct {}

impl Determinantable for OrthogonalProduct {
    fn determinant_value(&self) -> DeterminantValue {
        DeterminantValue::new(self.sign, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::householder::HouseholderMatrix;
    use crate::matrix::unit::UnitMatrix;

    #[test]
    fn single_reflector_product_has_negative_determinant() {
        let u = Vector::from_slice(&[1.0, 0.0]).unwrap();
        let h = Arc::new(HouseholderMatrix::from_unit_vector(u));
        let p = OrthogonalProduct::new(vec![h], -1).unwrap();
        assert_eq!(p.determinant(), -1.0);
    }

    #[test]
    fn composing_two_reflectors_is_orientation_preserving() {
        let u1 = Vector::from_slice(&[1.0, 0.0]).unwrap();
        let u2 = Vector::from_slice(&[0.0, 1.0]).unwrap();
        let h1: Arc<dyn Matrix> = Arc::new(HouseholderMatrix::from_unit_vector(u1));
        let h2: Arc<dyn Matrix> = Arc::new(HouseholderMatrix::from_unit_vector(u2));
        let p = OrthogonalProduct::new(vec![h1, h2], 1).unwrap();
        assert_eq!(p.determinant(), 1.0);
        let v = Vector::from_slice(&[3.0, 4.0]).unwrap();
        assert!(p.operate(&v).unwrap().all_close(&UnitMatrix::new(2).unwrap().operate(&v).unwrap().negated(), 1e-9));
    }
}
