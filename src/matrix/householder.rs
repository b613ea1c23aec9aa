//! Householder reflector `H = I - 2 u u^T` for a unit vector `u`.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_right_operable, Determinantable, EntryReadable, HouseholderReflector, Matrix, Orthogonal, Symmetric};
use crate::vector::Vector;

struct HouseholderMatrixData {
    u: Vector,
}

/// The reflection across the hyperplane orthogonal to `u`. `u` is expected
/// to already be of unit 2-norm; construction does not re-normalize it so
/// that a caller who has already computed a stable unit vector (per the
/// reflector-construction formula used by the QR solver) pays no extra cost.
#[derive(Clone)]
pub struct HouseholderMatrix(Arc<HouseholderMatrixData>);

impl HouseholderMatrix {
    pub fn from_unit_vector(u: Vector) -> HouseholderMatrix {
        HouseholderMatrix(Arc::new(HouseholderMatrixData { u }))
    }

    /// Builds the single reflector `H` carrying `source` exactly onto
    /// `target`: `H.operate(source) == target`. Requires `‖source‖ ==
    /// ‖target‖` (a reflection is norm-preserving, so no single `H` exists
    /// otherwise).
    ///
    /// This is the collapse of the classical `H1 · H2 · H1` construction —
    /// reflect `source` onto a pivot axis with `H1`, reflect that axis onto
    /// `target` with `H2`, conjugate `H2` by `H1` to fold both steps back
    /// into one elementary reflector — down to its closed form: for
    /// equal-norm `source`/`target`, `u = (source - target) / ‖source -
    /// target‖` already satisfies `H.operate(source) == target` directly, so
    /// the two intermediate reflections never need to be materialized.
    /// When `source` and `target` already coincide, `source - target` has
    /// no direction to normalize; any unit vector orthogonal to `source`
    /// reflects it to itself, which is the `target` in that case.
    pub fn from_reflection(source: &Vector, target: &Vector) -> Result<HouseholderMatrix> {
        if source.dim() != target.dim() {
            return Err(LinalgError::format_mismatch(source.dim().to_string(), target.dim().to_string()));
        }
        let norm_source = source.norm2();
        let norm_target = target.norm2();
        let scale = norm_source.max(norm_target).max(crate::config::STABILITY_ANCHOR);
        if (norm_source - norm_target).abs() > crate::config::DEFAULT_EPSILON * scale {
            return Err(LinalgError::IllegalArgument(format!(
                "from_reflection requires equal-norm source/target, got {norm_source} and {norm_target}"
            )));
        }
        if norm_source <= crate::config::STABILITY_ANCHOR {
            return Err(LinalgError::IllegalArgument("from_reflection requires a nonzero source vector".to_string()));
        }

        let diff = source.minus(target)?;
        let threshold = crate::config::DEFAULT_EPSILON * scale;
        let u = if diff.norm2() <= threshold {
            orthogonal_unit_vector(source)?
        } else {
            diff.normalized_euclidean()
        };
        Ok(HouseholderMatrix::from_unit_vector(u))
    }

    pub fn reflecting_vector(&self) -> &Vector {
        &self.0.u
    }

    fn n(&self) -> usize {
        self.0.u.dim().n()
    }
}

impl Matrix for HouseholderMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n()).expect("vector dim already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let coeff = 2.0 * self.0.u.dot(v)?;
        v.plus_c_times(&self.0.u, -coeff)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        self.operate(v)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}

impl Symmetric for HouseholderMatrix {}
impl Orthogonal for HouseholderMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        Arc::new(self.clone())
    }
}
impl HouseholderReflector for HouseholderMatrix {}

impl EntryReadable for HouseholderMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        let n = self.n();
        if i >= n || j >= n {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: n });
        }
        let ui = self.0.u.value_at(i)?;
        let uj = self.0.u.value_at(j)?;
        let delta = if i == j { 1.0 } else { 0.0 };
        Ok(delta - 2.0 * ui * uj)
    }

    fn entry_norm_max(&self) -> f64 {
        1.0
    }
}

impl Determinantable for HouseholderMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        DeterminantValue::new(-1, 0.0)
    }
}

/// A unit vector orthogonal to `source`, built by Gram-Schmidt against the
/// standard basis vector least aligned with it (the one `source` has its
/// smallest-magnitude component along, to keep the subtraction well
/// conditioned).
fn orthogonal_unit_vector(source: &Vector) -> Result<Vector> {
    let entries = source.entry_as_array();
    let k = entries
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.abs().partial_cmp(&b.abs()).unwrap())
        .map(|(i, _)| i)
        .expect("source has at least one entry");
    let mut pivot = vec![0.0; entries.len()];
    pivot[k] = 1.0;
    let pivot = Vector::from_slice(&pivot)?;
    let coeff = pivot.dot(source)? / source.norm2_square();
    let w = pivot.plus_c_times(source, -coeff)?;
    Ok(w.normalized_euclidean())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflects_the_generating_vector_to_its_negation() {
        let u = Vector::from_slice(&[1.0, 0.0]).unwrap();
        let h = HouseholderMatrix::from_unit_vector(u.clone());
        let r = h.operate(&u).unwrap();
        assert!((r.entry_as_array()[0] - (-1.0)).abs() < 1e-12);
        assert!(r.entry_as_array()[1].abs() < 1e-12);
    }

    #[test]
    fn fixes_orthogonal_vectors() {
        let u = Vector::from_slice(&[1.0, 0.0]).unwrap();
        let h = HouseholderMatrix::from_unit_vector(u);
        let orth = Vector::from_slice(&[0.0, 5.0]).unwrap();
        let r = h.operate(&orth).unwrap();
        assert_eq!(r.entry_as_array(), orth.entry_as_array());
    }

    #[test]
    fn is_involutory() {
        let u = Vector::from_slice(&[0.6, 0.8]).unwrap();
        let h = HouseholderMatrix::from_unit_vector(u);
        let x = Vector::from_slice(&[3.0, 4.0]).unwrap();
        let once = h.operate(&x).unwrap();
        let twice = h.operate(&once).unwrap();
        assert!(x.all_close(&twice, 1e-9));
    }

    #[test]
    fn determinant_is_negative_one() {
        let u = Vector::from_slice(&[1.0, 0.0, 0.0]).unwrap();
        let h = HouseholderMatrix::from_unit_vector(u);
        assert_eq!(h.determinant(), -1.0);
    }

    #[test]
    fn from_reflection_carries_source_onto_target() {
        let source = Vector::from_slice(&[3.0, 4.0, 0.0]).unwrap();
        let target = Vector::from_slice(&[0.0, 0.0, 5.0]).unwrap();
        let h = HouseholderMatrix::from_reflection(&source, &target).unwrap();
        assert!(h.operate(&source).unwrap().all_close(&target, 1e-10));
    }

    #[test]
    fn from_reflection_handles_coincident_source_and_target() {
        let v = Vector::from_slice(&[1.0, 2.0, -3.0]).unwrap();
        let h = HouseholderMatrix::from_reflection(&v, &v).unwrap();
        assert!(h.operate(&v).unwrap().all_close(&v, 1e-9));
    }

    #[test]
    fn from_reflection_rejects_unequal_norms() {
        let source = Vector::from_slice(&[1.0, 0.0]).unwrap();
        let target = Vector::from_slice(&[0.0, 2.0]).unwrap();
        assert!(HouseholderMatrix::from_reflection(&source, &target).is_err());
    }
}
