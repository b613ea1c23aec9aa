//! The polymorphic matrix interface and its capability marker traits.
//!
//! Every concrete representation in [`crate::matrix`] implements [`Matrix`];
//! additional guarantees are advertised by implementing the marker traits
//! below. Dispatch across heterogeneous matrix kinds (block entries,
//! orthogonal-product factors) goes through `Arc<dyn Matrix>` — the only
//! place this crate uses a trait object, per the redesign note that sealed
//! capability interfaces become composable traits plus a boxed interface
//! only where dispatch must fan in.

pub mod band;
pub mod block;
pub mod diagonal;
pub mod general;
pub mod householder;
pub mod ldlt;
pub mod orthogonal_product;
pub mod permutation;
pub mod product;
pub mod signature;
pub mod symmetric;
pub mod symmetric_band;
pub mod unit;
pub mod unitriangular;
pub mod zero;

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::{BandDim, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::util::cache::LazyCache;
use crate::vector::Vector;

/// The core polymorphic operator interface shared by every matrix
/// representation: dimension query, `M v`, and `M^T v`.
pub trait Matrix: Send + Sync {
    fn dim(&self) -> MatrixDim;

    /// `M v`. Fails with `MatrixFormatMismatch` if `v.dim() != dim().cols()`.
    fn operate(&self, v: &Vector) -> Result<Vector>;

    /// `M^T v`. Fails with `MatrixFormatMismatch` if `v.dim() != dim().rows()`.
    fn operate_transpose(&self, v: &Vector) -> Result<Vector>;

    /// The transpose of `self`, lazily constructed and cached so repeated
    /// calls return the same underlying companion. Symmetric types return a
    /// cheap handle to themselves; every other type returns a
    /// [`TransposeOf`] wrapper, whose own `transpose()` hands back the
    /// original — `A.transpose().transpose()` is the same shared storage as
    /// `A`, satisfying the identity round trip without recomputation.
    fn transpose(&self) -> Arc<dyn Matrix>;
}

pub(crate) fn check_right_operable(dim: MatrixDim, v: &Vector) -> Result<()> {
    if dim.right_operable(v.dim()) {
        Ok(())
    } else {
        Err(LinalgError::format_mismatch(
            format!("vector of dim {}", dim.right_dim()),
            v.dim().to_string(),
        ))
    }
}

pub(crate) fn check_left_operable(dim: MatrixDim, v: &Vector) -> Result<()> {
    if dim.left_operable(v.dim()) {
        Ok(())
    } else {
        Err(LinalgError::format_mismatch(
            format!("vector of dim {}", dim.left_dim()),
            v.dim().to_string(),
        ))
    }
}

/// `operate_transpose(v) == operate(v)` and `transpose() == self`.
pub trait Symmetric: Matrix {}

/// `operate(operate_transpose(v)) == v`; `inverse() == transpose()`.
pub trait Orthogonal: Matrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        self.transpose()
    }
}

/// `inverse()` returns a matrix `B` with `A.operate(B.operate(v)) == v`.
pub trait Invertible: Matrix {
    fn inverse(&self) -> Arc<dyn Matrix>;
}

/// `determinant() == sign_of_determinant() * exp(log_abs_determinant())`.
pub trait Determinantable: Matrix {
    fn determinant_value(&self) -> DeterminantValue;

    fn determinant(&self) -> f64 {
        self.determinant_value().determinant()
    }

    fn log_abs_determinant(&self) -> f64 {
        self.determinant_value().log_abs_determinant()
    }

    fn sign_of_determinant(&self) -> i32 {
        self.determinant_value().sign()
    }
}

/// Direct entry access, for the matrices that can cheaply offer it.
pub trait EntryReadable: Matrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64>;
    fn entry_norm_max(&self) -> f64;
}

/// Entries outside the declared band are structurally zero.
pub trait Band: Matrix {
    fn band_dim(&self) -> BandDim;
}

/// Off-diagonal entries are structurally zero.
pub trait Diagonal: Band + EntryReadable {
    fn diagonal_value_at(&self, i: usize) -> Result<f64>;
}

/// A diagonal matrix whose entries are all `+1` or `-1`.
pub trait Signature: Diagonal {
    /// `true` iff an odd number of diagonal entries are `-1`.
    fn is_odd_parity(&self) -> bool;
}

/// A matrix representing a permutation of the standard basis.
pub trait Permutation: Matrix + Orthogonal {
    fn image_of(&self, i: usize) -> usize;
    fn is_odd_parity(&self) -> bool;
}

/// Lower-triangular with a unit diagonal (dense or band-packed).
pub trait LowerUnitriangular: Band + EntryReadable {}

/// `H = I - 2uu^T`: both symmetric and orthogonal, with `det = -1`.
pub trait HouseholderReflector: Symmetric + Orthogonal + Determinantable {}

/// Generic lazily-cached transpose companion for any matrix type that is
/// not itself symmetric. `TransposeOf<T>` swaps `operate`/`operate_transpose`
/// and, when `T` also implements a capability trait whose contract survives
/// the swap (`Orthogonal`), that capability is re-derived generically below.
pub struct TransposeOf<T> {
    inner: T,
    cache: LazyCache<Arc<dyn Matrix>>,
}

impl<T: Matrix + Clone + 'static> TransposeOf<T> {
    pub fn new(inner: T) -> Self {
        TransposeOf {
            inner,
            cache: LazyCache::new(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Matrix + Clone + 'static> Matrix for TransposeOf<T> {
    fn dim(&self) -> MatrixDim {
        self.inner.dim().transposed()
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        self.inner.operate_transpose(v)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.inner.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        self.cache
            .get_or_init(|| Arc::new(self.inner.clone()) as Arc<dyn Matrix>)
            .clone()
    }
}

impl<T: Orthogonal + Clone + 'static> Orthogonal for TransposeOf<T> {}

/// Build a `TransposeOf` wrapper directly, the free-function counterpart of
/// the per-type cached `transpose()` method — used by implementers of the
/// concrete matrix types to fill in their own `transpose()` bodies.
pub fn create_transposed_of<T: Matrix + Clone + 'static>(a: &T) -> Arc<dyn Matrix> {
    Arc::new(TransposeOf::new(a.clone()))
}
