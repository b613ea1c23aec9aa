//! Block-diagonal matrices (1x1/2x2 pivot blocks) and the `L D L^T`
//! composite they assemble into, shared by the plain and pivoted
//! symmetric factorizations.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{
    check_right_operable, Band, Determinantable, EntryReadable, Invertible, Matrix, Symmetric,
};
use crate::matrix::unitriangular::UnitriangularMatrix;
use crate::util::cache::LazyCache;
use crate::vector::{canonicalize, Vector};

/// A single diagonal pivot block: a `1x1` scalar, or a symmetric `2x2`
/// block `[[a, b], [b, d]]` — the shape modified Cholesky needs when a
/// pivot is indefinite but a neighboring pair is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PivotBlock {
    One(f64),
    Two { a: f64, b: f64, d: f64 },
}

impl PivotBlock {
    fn width(&self) -> usize {
        match self {
            PivotBlock::One(_) => 1,
            PivotBlock::Two { .. } => 2,
        }
    }

    fn determinant(&self) -> f64 {
        match self {
            PivotBlock::One(x) => *x,
            PivotBlock::Two { a, b, d } => a * d - b * b,
        }
    }

    fn inverse(&self) -> PivotBlock {
        match self {
            PivotBlock::One(x) => PivotBlock::One(1.0 / x),
            PivotBlock::Two { a, b, d } => {
                let det = a * d - b * b;
                PivotBlock::Two {
                    a: d / det,
                    b: -b / det,
                    d: a / det,
                }
            }
        }
    }
}

struct BlockDiagonalMatrixData {
    n: usize,
    blocks: Vec<PivotBlock>,
    // `starts[k]` is the row/column index where `blocks[k]` begins.
    starts: Vec<usize>,
}

/// A symmetric matrix that is block-diagonal with `1x1`/`2x2` blocks.
#[derive(Clone)]
pub struct BlockDiagonalMatrix(Arc<BlockDiagonalMatrixData>);

impl BlockDiagonalMatrix {
    pub fn new(blocks: Vec<PivotBlock>) -> Result<BlockDiagonalMatrix> {
        if blocks.is_empty() {
            return Err(LinalgError::IllegalArgument("block-diagonal matrix must have at least one block".to_string()));
        }
        let mut starts = Vec::with_capacity(blocks.len());
        let mut n = 0usize;
        for b in &blocks {
            starts.push(n);
            n += b.width();
        }
        Ok(BlockDiagonalMatrix(Arc::new(BlockDiagonalMatrixData { n, blocks, starts })))
    }

    fn locate(&self, i: usize) -> usize {
        // binary search for the block containing row/column i
        match self.0.starts.binary_search(&i) {
            Ok(k) => k,
            Err(k) => k - 1,
        }
    }

    fn n(&self) -> usize {
        self.0.n
    }
}

impl Matrix for BlockDiagonalMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n()).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n()];
        for (k, block) in self.0.blocks.iter().enumerate() {
            let start = self.0.starts[k];
            match block {
                PivotBlock::One(x) => out[start] = canonicalize(x * v.as_slice()[start]),
                PivotBlock::Two { a, b, d } => {
                    let (v0, v1) = (v.as_slice()[start], v.as_slice()[start + 1]);
                    out[start] = canonicalize(a * v0 + b * v1);
                    out[start + 1] = canonicalize(b * v0 + d * v1);
                }
            }
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

impl Symmetric for BlockDiagonalMatrix {}

impl Band for BlockDiagonalMatrix {
    fn band_dim(&self) -> BandDim {
        BandDim::new(self.n(), 1, 1).expect("2x2 blocks never exceed a single subdiagonal")
    }
}

impl EntryReadable for BlockDiagonalMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        if i >= self.n() || j >= self.n() {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: self.n() });
        }
        let ki = self.locate(i);
        let kj = self.locate(j);
        if ki != kj {
            return Ok(0.0);
        }
        let start = self.0.starts[ki];
        Ok(match self.0.blocks[ki] {
            PivotBlock::One(x) => x,
            PivotBlock::Two { a, b, d } => match (i - start, j - start) {
                (0, 0) => a,
                (0, 1) | (1, 0) => b,
                (1, 1) => d,
                _ => unreachable!(),
            },
        })
    }

    fn entry_norm_max(&self) -> f64 {
        self.0
            .blocks
            .iter()
            .flat_map(|b| match b {
                PivotBlock::One(x) => vec![x.abs()],
                PivotBlock::Two { a, b, d } => vec![a.abs(), b.abs(), d.abs()],
            })
            .fold(0.0, f64::max)
    }
}

impl Invertible for BlockDiagonalMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        let blocks = self.0.blocks.iter().map(|b| b.inverse()).collect();
        Arc::new(BlockDiagonalMatrix::new(blocks).expect("same shape as self"))
    }
}

impl Determinantable for BlockDiagonalMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        self.0.blocks.iter().map(|b| DeterminantValue::of_scalar(b.determinant())).collect()
    }
}

struct SymmetricMultipliedData<D> {
    l: UnitriangularMatrix,
    d: D,
    transpose_cache: LazyCache<Arc<dyn Matrix>>,
}

/// `L D L^T`: the reconstruction of a symmetric matrix from its pivoted
/// factorization. Shared by plain `LDL^T` (`D` diagonal) and modified
/// Cholesky (`D` block-diagonal with `2x2` pivots).
pub struct SymmetricMultiplied<D>(Arc<SymmetricMultipliedData<D>>);

impl<D> Clone for SymmetricMultiplied<D> {
    fn clone(&self) -> Self {
        SymmetricMultiplied(self.0.clone())
    }
}

impl<D: Matrix + Symmetric + Determinantable + Invertible + Clone + 'static> SymmetricMultiplied<D> {
    pub fn new(l: UnitriangularMatrix, d: D) -> Result<Self> {
        if l.dim().cols() != d.dim().rows() {
            return Err(LinalgError::format_mismatch(l.dim().to_string(), d.dim().to_string()));
        }
        Ok(SymmetricMultiplied(Arc::new(SymmetricMultipliedData {
            l,
            d,
            transpose_cache: LazyCache::new(),
        })))
    }

    pub fn d(&self) -> &D {
        &self.0.d
    }

    pub fn l(&self) -> &UnitriangularMatrix {
        &self.0.l
    }
}

impl<D: Matrix + Symmetric + Determinantable + Invertible + Clone + 'static> Matrix for SymmetricMultiplied<D> {
    fn dim(&self) -> MatrixDim {
        self.0.l.dim()
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        let lt_v = self.0.l.operate_transpose(v)?;
        let d_lt_v = self.0.d.operate(&lt_v)?;
        self.0.l.operate(&d_lt_v)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl<D: Matrix + Symmetric + Determinantable + Invertible + Clone + 'static> Symmetric for SymmetricMultiplied<D> {}

impl<D: Matrix + Symmetric + Determinantable + Invertible + Clone + 'static> Determinantable for SymmetricMultiplied<D> {
    fn determinant_value(&self) -> DeterminantValue {
        // det(L) == 1, so det(L D L^T) == det(D).
        self.0.d.determinant_value()
    }
}

impl<D: Matrix + Symmetric + Determinantable + Invertible + Clone + 'static> Invertible for SymmetricMultiplied<D> {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(SymmetricMultipliedInverse {
            l_inv: self.0.l.inverse(),
            d_inv: self.0.d.inverse(),
            dim: self.dim(),
        })
    }
}

struct SymmetricMultipliedInverse {
    l_inv: Arc<dyn Matrix>,
    d_inv: Arc<dyn Matrix>,
    dim: MatrixDim,
}

impl Matrix for SymmetricMultipliedInverse {
    fn dim(&self) -> MatrixDim {
        self.dim
    }

    /// `(L D L^T)^{-1} v = L^{-T} D^{-1} L^{-1} v`.
    fn operate(&self, v: &Vector) -> Result<Vector> {
        let x = self.l_inv.operate(v)?;
        let y = self.d_inv.operate(&x)?;
        self.l_inv.transpose().operate(&y)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(SymmetricMultipliedInverse {
            l_inv: self.l_inv.clone(),
            d_inv: self.d_inv.clone(),
            dim: self.dim,
        })
    }
}
