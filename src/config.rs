//! Crate-wide numeric configuration.
//!
//! There is no configuration file and no environment-variable surface — the
//! kernel's only tunable is the per-call `epsilon` accepted by every solver
//! executor's `apply`.

/// Default tolerance used by `Executor::apply` when the caller does not
/// supply one explicitly.
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// Anchor added to the caller's `epsilon` inside every solver so that an
/// `epsilon` of exactly zero still rejects exactly-singular pivots instead
/// of admitting them by a literal zero threshold.
pub const STABILITY_ANCHOR: f64 = 1e-100;

/// Upper bound on `rows * cols` for dense storage, chosen so a `Vec<f64>`
/// backing a dense buffer cannot overflow addressable memory on a 32-bit
/// `usize` while staying generous for 64-bit hosts.
pub const MAX_DENSE_ELEMENTS: usize = 1 << 28;

/// Upper bound on `n * (b_l + b_u + 1)` for band storage.
pub const MAX_BAND_ELEMENTS: usize = 1 << 28;

/// Largest accepted `VectorDim`/`MatrixDim` dimension value.
pub const MAX_DIM: usize = 1 << 30;

pub(crate) fn validate_epsilon(epsilon: f64) -> crate::error::Result<()> {
    if epsilon.is_finite() && epsilon >= 0.0 {
        Ok(())
    } else {
        Err(crate::error::LinalgError::IllegalArgument(format!(
            "epsilon must be finite and non-negative, got {epsilon}"
        )))
    }
}
