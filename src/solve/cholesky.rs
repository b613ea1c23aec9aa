//! Dense Cholesky factorization of a symmetric positive-definite matrix:
//! `A = L L^T`.

use std::sync::Arc;

use crate::config::validate_epsilon;
use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_right_operable, Determinantable, EntryReadable, Invertible, Matrix, Symmetric};
use crate::solve::{Acceptance, Executor};
use crate::vector::{canonicalize, Vector};

pub struct CholeskyExecutor;

pub fn executor() -> CholeskyExecutor {
    CholeskyExecutor
}

impl<M: Symmetric + EntryReadable> Executor<M> for CholeskyExecutor {
    type Output = Cholesky;

    fn accepts(&self, matrix: &M) -> Acceptance {
        if matrix.dim().is_square() {
            Acceptance::Accepted
        } else {
            Acceptance::rejected(format!("Cholesky requires a square matrix, got {}", matrix.dim()))
        }
    }

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<Cholesky>> {
        tracing::debug!(dim = %matrix.dim(), epsilon, "cholesky: starting elimination");
        validate_epsilon(epsilon)?;
        let dim = matrix.dim();
        if !dim.is_square() {
            return Err(LinalgError::NotSquare { rows: dim.rows(), cols: dim.cols() });
        }
        let n = dim.rows();
        let scale = matrix.entry_norm_max().max(crate::config::STABILITY_ANCHOR);

        // `l[i * n + j]` holds `L(i, j)` for `j <= i`; the strict upper
        // triangle is never written.
        let mut l = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let mut sum = matrix.value_at(i, j)?;
                for k in 0..j {
                    sum -= l[i * n + k] * l[j * n + k];
                }
                if i == j {
                    if sum <= epsilon * scale {
                        tracing::warn!(row = i, pivot = sum, "cholesky: matrix is not positive definite");
                        return Ok(None);
                    }
                    tracing::trace!(row = i, pivot = sum, "cholesky: diagonal pivot accepted");
                    l[i * n + i] = canonicalize(sum.sqrt());
                } else {
                    l[i * n + j] = canonicalize(sum / l[j * n + j]);
                }
            }
        }

        let l_full = LowerDenseFactor::new(n, l);
        // det(A) = det(L)^2, each diagonal contributing its square
        let det: DeterminantValue = (0..n)
            .map(|i| DeterminantValue::of_scalar(l_full.diag(i)))
            .map(|d| d.combine(&d))
            .collect();
        Ok(Some(Cholesky { l: l_full, det, dim }))
    }
}

/// Dense lower-triangular factor with an explicit (non-unit) diagonal.
#[derive(Clone)]
struct LowerDenseFactor {
    n: usize,
    values: Arc<Vec<f64>>,
}

impl LowerDenseFactor {
    fn new(n: usize, values: Vec<f64>) -> Self {
        LowerDenseFactor { n, values: Arc::new(values) }
    }

    fn diag(&self, i: usize) -> f64 {
        self.values[i * self.n + i]
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.values[i * self.n + j]
        }
    }
}

impl Matrix for LowerDenseFactor {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n];
        for i in 0..self.n {
            let mut acc = 0.0;
            for j in 0..=i {
                acc += self.at(i, j) * v.as_slice()[j];
            }
            out[i] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        crate::matrix::check_left_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n];
        for j in 0..self.n {
            let mut acc = 0.0;
            for i in j..self.n {
                acc += self.at(i, j) * v.as_slice()[i];
            }
            out[j] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        crate::matrix::create_transposed_of(self)
    }
}

impl LowerDenseFactor {
    /// Solves `L x = v` by forward substitution.
    fn solve(&self, v: &Vector) -> Result<Vector> {
        let mut x = vec![0.0; self.n];
        for i in 0..self.n {
            let mut acc = v.as_slice()[i];
            for j in 0..i {
                acc -= self.at(i, j) * x[j];
            }
            x[i] = canonicalize(acc / self.diag(i));
        }
        Vector::from_slice(&x)
    }

    /// Solves `L^T x = v` by back substitution.
    fn solve_transpose(&self, v: &Vector) -> Result<Vector> {
        let mut x = vec![0.0; self.n];
        for i in (0..self.n).rev() {
            let mut acc = v.as_slice()[i];
            for j in (i + 1)..self.n {
                acc -= self.at(j, i) * x[j];
            }
            x[i] = canonicalize(acc / self.diag(i));
        }
        Vector::from_slice(&x)
    }
}

/// `A = L L^T`.
#[derive(Clone)]
pub struct Cholesky {
    l: LowerDenseFactor,
    det: DeterminantValue,
    dim: MatrixDim,
}

impl Cholesky {
    pub fn l(&self) -> impl Matrix + Clone {
        self.l.clone()
    }
}

impl Matrix for Cholesky {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        let ltv = self.l.operate_transpose(v)?;
        self.l.operate(&ltv)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Symmetric for Cholesky {}

impl Determinantable for Cholesky {
    fn determinant_value(&self) -> DeterminantValue {
        self.det
    }
}

impl Invertible for Cholesky {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(CholeskyInverse { l: self.l.clone(), dim: self.dim })
    }
}

#[derive(Clone)]
struct CholeskyInverse {
    l: LowerDenseFactor,
    dim: MatrixDim,
}

impl Matrix for CholeskyInverse {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim, v)?;
        let y = self.l.solve(v)?;
        self.l.solve_transpose(&y)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}
