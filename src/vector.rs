//! Immutable finite-dimensional real vector.

use std::sync::Arc;

use crate::config::STABILITY_ANCHOR;
use crate::dim::VectorDim;
use crate::error::{LinalgError, Result};
use crate::util::cache::LazyCache;
use crate::util::norm;

/// Map a raw `f64` into the accepted domain of finite doubles:
/// `+inf -> MAX`, `-inf -> MIN`, `NaN -> 0`.
pub fn canonicalize(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else if x == f64::INFINITY {
        f64::MAX
    } else if x == f64::NEG_INFINITY {
        f64::MIN
    } else {
        x
    }
}

fn is_canonical(x: f64) -> bool {
    x.is_finite()
}

struct VectorData {
    dim: VectorDim,
    values: Vec<f64>,
    norm_max: LazyCache<f64>,
}

/// An immutable vector of `dim().n()` finite canonical doubles.
///
/// Cheap to clone: internally reference-counted, so clones share storage
/// and any lazily computed caches.
#[derive(Clone)]
pub struct Vector(Arc<VectorData>);

impl Vector {
    pub fn dim(&self) -> VectorDim {
        self.0.dim
    }

    pub fn value_at(&self, i: usize) -> Result<f64> {
        self.0
            .values
            .get(i)
            .copied()
            .ok_or(LinalgError::IndexOutOfBounds {
                index: i,
                bound: self.0.dim.n(),
            })
    }

    /// A defensive copy of the backing array.
    pub fn entry_as_array(&self) -> Vec<f64> {
        self.0.values.clone()
    }

    pub(crate) fn as_slice(&self) -> &[f64] {
        &self.0.values
    }

    fn check_same_dim(&self, other: &Vector) -> Result<()> {
        if self.dim() == other.dim() {
            Ok(())
        } else {
            Err(LinalgError::format_mismatch(
                self.dim().to_string(),
                other.dim().to_string(),
            ))
        }
    }

    pub fn plus(&self, other: &Vector) -> Result<Vector> {
        self.plus_c_times(other, 1.0)
    }

    pub fn minus(&self, other: &Vector) -> Result<Vector> {
        self.plus_c_times(other, -1.0)
    }

    /// `self + c * other`.
    pub fn plus_c_times(&self, other: &Vector, c: f64) -> Result<Vector> {
        self.check_same_dim(other)?;
        let values: Vec<f64> = self
            .0
            .values
            .iter()
            .zip(other.0.values.iter())
            .map(|(&a, &b)| canonicalize(a + c * b))
            .collect();
        Ok(Vector(Arc::new(VectorData {
            dim: self.dim(),
            values,
            norm_max: LazyCache::new(),
        })))
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_same_dim(other)?;
        Ok(self
            .0
            .values
            .iter()
            .zip(other.0.values.iter())
            .map(|(&a, &b)| a * b)
            .sum())
    }

    pub fn times(&self, c: f64) -> Vector {
        let values: Vec<f64> = self.0.values.iter().map(|&x| canonicalize(c * x)).collect();
        Vector(Arc::new(VectorData {
            dim: self.dim(),
            values,
            norm_max: LazyCache::new(),
        }))
    }

    pub fn negated(&self) -> Vector {
        self.times(-1.0)
    }

    pub fn norm_max(&self) -> f64 {
        *self.0.norm_max.get_or_init(|| norm::max_abs(&self.0.values))
    }

    pub fn norm1(&self) -> f64 {
        norm::sum_abs(&self.0.values)
    }

    pub fn norm2(&self) -> f64 {
        norm::scaled_euclidean_norm(&self.0.values, self.norm_max())
    }

    pub fn norm2_square(&self) -> f64 {
        norm::scaled_euclidean_norm_square(&self.0.values, self.norm_max())
    }

    /// `self` normalized to unit 2-norm; returns `self` unchanged when
    /// `norm_max() == 0` (the zero vector has no well-defined direction).
    pub fn normalized_euclidean(&self) -> Vector {
        if self.norm_max() == 0.0 {
            return self.clone();
        }
        let n = self.norm2();
        self.times(1.0 / n)
    }

    /// `true` iff every entry of `self` and `other` agree within `tol`
    /// (absolute, scaled by the larger operand's max-norm).
    pub fn all_close(&self, other: &Vector, tol: f64) -> bool {
        if self.dim() != other.dim() {
            return false;
        }
        let scale = self.norm_max().max(other.norm_max()).max(1.0);
        self.0
            .values
            .iter()
            .zip(other.0.values.iter())
            .all(|(&a, &b)| (a - b).abs() <= tol * scale + STABILITY_ANCHOR)
    }

    pub fn zero(dim: VectorDim) -> Vector {
        Vector(Arc::new(VectorData {
            dim,
            values: vec![0.0; dim.n()],
            norm_max: LazyCache::new(),
        }))
    }

    pub fn from_slice(values: &[f64]) -> Result<Vector> {
        let dim = VectorDim::new(values.len())?;
        let values: Vec<f64> = values.iter().map(|&x| canonicalize(x)).collect();
        Ok(Vector(Arc::new(VectorData {
            dim,
            values,
            norm_max: LazyCache::new(),
        })))
    }
}

impl std::fmt::Debug for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vector").field("values", &self.0.values).finish()
    }
}

/// Single-use builder for [`Vector`].
///
/// Every mutator validates that the builder has not already been consumed
/// by `build()`; calling a mutator or `build()` a second time raises
/// [`LinalgError::IllegalArgument`].
pub struct VectorBuilder {
    dim: VectorDim,
    values: Vec<f64>,
    built: bool,
}

impl VectorBuilder {
    pub fn zero_builder(dim: VectorDim) -> VectorBuilder {
        VectorBuilder {
            dim,
            values: vec![0.0; dim.n()],
            built: false,
        }
    }

    fn check_not_built(&self) -> Result<()> {
        if self.built {
            Err(LinalgError::IllegalArgument(
                "builder has already been built".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn set_value(&mut self, i: usize, x: f64) -> Result<&mut Self> {
        self.check_not_built()?;
        if i >= self.dim.n() {
            return Err(LinalgError::IndexOutOfBounds {
                index: i,
                bound: self.dim.n(),
            });
        }
        self.values[i] = canonicalize(x);
        Ok(self)
    }

    /// Like [`Self::set_value`], but if `x` is not already canonical
    /// (finite), calls `err` instead of silently canonicalizing it.
    pub fn set_value_or_else_throw(
        &mut self,
        i: usize,
        x: f64,
        err: impl FnOnce() -> LinalgError,
    ) -> Result<&mut Self> {
        self.check_not_built()?;
        if i >= self.dim.n() {
            return Err(LinalgError::IndexOutOfBounds {
                index: i,
                bound: self.dim.n(),
            });
        }
        if !is_canonical(x) {
            return Err(err());
        }
        self.values[i] = x;
        Ok(self)
    }

    /// Overwrites the whole backing array with a defensive copy of `xs`.
    pub fn set_entry_value(&mut self, xs: &[f64]) -> Result<&mut Self> {
        self.check_not_built()?;
        if xs.len() != self.dim.n() {
            return Err(LinalgError::format_mismatch(
                self.dim.to_string(),
                format!("VectorDim(n={})", xs.len()),
            ));
        }
        self.values = xs.iter().map(|&x| canonicalize(x)).collect();
        Ok(self)
    }

    pub fn build(&mut self) -> Result<Vector> {
        self.check_not_built()?;
        self.built = true;
        Ok(Vector(Arc::new(VectorData {
            dim: self.dim,
            values: std::mem::take(&mut self.values),
            norm_max: LazyCache::new(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(xs: &[f64]) -> Vector {
        Vector::from_slice(xs).unwrap()
    }

    #[test]
    fn canonicalizes_non_finite_inputs() {
        let x = v(&[f64::INFINITY, f64::NEG_INFINITY, f64::NAN, 1.0]);
        assert_eq!(x.value_at(0).unwrap(), f64::MAX);
        assert_eq!(x.value_at(1).unwrap(), f64::MIN);
        assert_eq!(x.value_at(2).unwrap(), 0.0);
        assert_eq!(x.value_at(3).unwrap(), 1.0);
    }

    #[test]
    fn plus_c_times_and_minus() {
        let a = v(&[1.0, 2.0, 3.0]);
        let b = v(&[4.0, 5.0, 6.0]);
        let r = a.plus_c_times(&b, 2.0).unwrap();
        assert_eq!(r.entry_as_array(), vec![9.0, 12.0, 15.0]);
        let d = b.minus(&a).unwrap();
        assert_eq!(d.entry_as_array(), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn norms() {
        let a = v(&[3.0, 4.0]);
        assert!((a.norm2() - 5.0).abs() < 1e-12);
        assert_eq!(a.norm1(), 7.0);
        assert_eq!(a.norm_max(), 4.0);
        assert_eq!(a.norm2_square(), 25.0);
    }

    #[test]
    fn normalized_euclidean_is_unit_and_zero_vector_passthrough() {
        let a = v(&[3.0, 4.0]);
        let u = a.normalized_euclidean();
        assert!((u.norm2() - 1.0).abs() < 1e-12);

        let zero = Vector::zero(VectorDim::new(3).unwrap());
        let still_zero = zero.normalized_euclidean();
        assert_eq!(still_zero.entry_as_array(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn builder_rejects_use_after_build() {
        let mut b = VectorBuilder::zero_builder(VectorDim::new(2).unwrap());
        b.set_value(0, 1.0).unwrap();
        let _ = b.build().unwrap();
        assert!(b.set_value(1, 2.0).is_err());
        assert!(b.build().is_err());
    }

    #[test]
    fn builder_index_out_of_bounds() {
        let mut b = VectorBuilder::zero_builder(VectorDim::new(2).unwrap());
        assert!(b.set_value(5, 1.0).is_err());
    }

    #[test]
    fn dot_product() {
        let a = v(&[1.0, 2.0, 3.0]);
        let b = v(&[4.0, 5.0, 6.0]);
        assert_eq!(a.dot(&b).unwrap(), 32.0);
    }
}
