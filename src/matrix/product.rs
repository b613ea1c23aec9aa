//! Ordered product of matrices, applied right-to-left: `(A_1 A_2 ... A_k) v`.

use std::sync::Arc;

use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_left_operable, check_right_operable, Matrix};
use crate::vector::Vector;

struct MatrixProductData {
    dim: MatrixDim,
    // applied to a vector in reverse (last factor first)
    factors: Vec<Arc<dyn Matrix>>,
}

/// `A_1 A_2 ... A_k`, stored as an ordered sequence of factors so that each
/// keeps its own representation instead of being densified.
#[derive(Clone)]
pub struct MatrixProduct(Arc<MatrixProductData>);

impl MatrixProduct {
    pub fn new(factors: Vec<Arc<dyn Matrix>>) -> Result<MatrixProduct> {
        if factors.is_empty() {
            return Err(LinalgError::IllegalArgument("matrix product must have at least one factor".to_string()));
        }
        for pair in factors.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if left.dim().cols() != right.dim().rows() {
                return Err(LinalgError::format_mismatch(
                    format!("{} cols", left.dim()),
                    format!("{} rows", right.dim()),
                ));
            }
        }
        let dim = MatrixDim::new(factors.first().unwrap().dim().rows(), factors.last().unwrap().dim().cols())?;
        Ok(MatrixProduct(Arc::new(MatrixProductData { dim, factors })))
    }
}

impl Matrix for MatrixProduct {
    fn dim(&self) -> MatrixDim {
        self.0.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let mut cur = v.clone();
        for factor in self.0.factors.iter().rev() {
            cur = factor.operate(&cur)?;
        }
        Ok(cur)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let mut cur = v.clone();
        for factor in self.0.factors.iter() {
            cur = factor.operate_transpose(&cur)?;
        }
        Ok(cur)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        let reversed: Vec<Arc<dyn Matrix>> = self.0.factors.iter().rev().map(|f| f.transpose()).collect();
        Arc::new(MatrixProduct::new(reversed).expect("transposed factors remain chainable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::diagonal::DiagonalMatrix;

    #[test]
    fn operate_applies_factors_right_to_left() {
        let a = Arc::new(DiagonalMatrix::from_slice(&[2.0, 3.0]).unwrap());
        let b = Arc::new(DiagonalMatrix::from_slice(&[5.0, 7.0]).unwrap());
        let p = MatrixProduct::new(vec![a, b]).unwrap();
        let v = Vector::from_slice(&[1.0, 1.0]).unwrap();
        // (A B) v = A (B v) = A [5, 7] = [10, 21]
        assert_eq!(p.operate(&v).unwrap().entry_as_array(), vec![10.0, 21.0]);
    }

    #[test]
    fn rejects_non_chainable_factors() {
        let a = Arc::new(DiagonalMatrix::from_slice(&[1.0, 2.0, 3.0]).unwrap());
        let b = Arc::new(DiagonalMatrix::from_slice(&[1.0]).unwrap());
        assert!(MatrixProduct::new(vec![a, b]).is_err());
    }
}
