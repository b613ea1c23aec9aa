//! Dense, unstructured real matrix stored row-major.

use std::sync::Arc;

use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_left_operable, check_right_operable, create_transposed_of, EntryReadable, Matrix};
use crate::util::cache::LazyCache;
use crate::util::norm;
use crate::vector::{canonicalize, Vector};

struct GeneralMatrixData {
    dim: MatrixDim,
    values: Vec<f64>,
    transpose: LazyCache<Arc<dyn Matrix>>,
    norm_max: LazyCache<f64>,
}

/// A dense `rows x cols` matrix with no assumed structure.
#[derive(Clone)]
pub struct GeneralMatrix(Arc<GeneralMatrixData>);

impl GeneralMatrix {
    fn index(&self, i: usize, j: usize) -> usize {
        i * self.0.dim.cols() + j
    }
}

impl Matrix for GeneralMatrix {
    fn dim(&self) -> MatrixDim {
        self.0.dim
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let cols = self.0.dim.cols();
        let mut out = vec![0.0; self.0.dim.rows()];
        for (i, slot) in out.iter_mut().enumerate() {
            let row = &self.0.values[i * cols..(i + 1) * cols];
            *slot = canonicalize(row.iter().zip(v.as_slice()).map(|(&a, &b)| a * b).sum());
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let (rows, cols) = (self.0.dim.rows(), self.0.dim.cols());
        let mut out = vec![0.0; cols];
        for i in 0..rows {
            let vi = v.as_slice()[i];
            if vi == 0.0 {
                continue;
            }
            let row = &self.0.values[i * cols..(i + 1) * cols];
            for (slot, &a) in out.iter_mut().zip(row.iter()) {
                *slot = canonicalize(*slot + a * vi);
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

impl EntryReadable for GeneralMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        let (rows, cols) = (self.0.dim.rows(), self.0.dim.cols());
        if i >= rows || j >= cols {
            return Err(LinalgError::IndexOutOfBounds {
                index: i.max(j),
                bound: rows.max(cols),
            });
        }
        Ok(self.0.values[self.index(i, j)])
    }

    fn entry_norm_max(&self) -> f64 {
        *self.0.norm_max.get_or_init(|| norm::max_abs(&self.0.values))
    }
}

/// Single-use builder for [`GeneralMatrix`].
pub struct GeneralMatrixBuilder {
    dim: MatrixDim,
    values: Vec<f64>,
    built: bool,
}

impl GeneralMatrixBuilder {
    pub fn zero_builder(dim: MatrixDim) -> Result<GeneralMatrixBuilder> {
        if !dim.is_accepted_for_dense_matrix() {
            return Err(LinalgError::ElementsTooMany {
                rows: dim.rows(),
                cols: dim.cols(),
            });
        }
        Ok(GeneralMatrixBuilder {
            dim,
            values: vec![0.0; dim.rows() * dim.cols()],
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
        let (rows, cols) = (self.dim.rows(), self.dim.cols());
        if i >= rows || j >= cols {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: rows.max(cols) });
        }
        self.values[i * cols + j] = canonicalize(x);
        Ok(self)
    }

    pub fn build(&mut self) -> Result<GeneralMatrix> {
        self.check_not_built()?;
        self.built = true;
        Ok(GeneralMatrix(Arc::new(GeneralMatrixData {
            dim: self.dim,
            values: std::mem::take(&mut self.values),
            transpose: LazyCache::new(),
            norm_max: LazyCache::new(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat2x3() -> GeneralMatrix {
        let mut b = GeneralMatrixBuilder::zero_builder(MatrixDim::new(2, 3).unwrap()).unwrap();
        b.set_value(0, 0, 1.0).unwrap();
        b.set_value(0, 1, 2.0).unwrap();
        b.set_value(0, 2, 3.0).unwrap();
        b.set_value(1, 0, 4.0).unwrap();
        b.set_value(1, 1, 5.0).unwrap();
        b.set_value(1, 2, 6.0).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn operate_matches_hand_computation() {
        let m = mat2x3();
        let v = Vector::from_slice(&[1.0, 0.0, 1.0]).unwrap();
        let r = m.operate(&v).unwrap();
        assert_eq!(r.entry_as_array(), vec![4.0, 10.0]);
    }

    #[test]
    fn operate_transpose_matches_transpose_operate() {
        let m = mat2x3();
        let v = Vector::from_slice(&[1.0, 2.0]).unwrap();
        let direct = m.operate_transpose(&v).unwrap();
        let via_transpose = m.transpose().operate(&v).unwrap();
        assert_eq!(direct.entry_as_array(), via_transpose.entry_as_array());
    }

    #[test]
    fn transpose_of_transpose_is_original_dim() {
        let m = mat2x3();
        let tt = m.transpose().transpose();
        assert_eq!(tt.dim(), m.dim());
    }

    #[test]
    fn rejects_mismatched_operate_dim() {
        let m = mat2x3();
        let v = Vector::from_slice(&[1.0, 2.0]).unwrap();
        assert!(m.operate(&v).is_err());
    }
}
