//! The factorization solvers: each accepts an [`EntryReadable`] matrix and,
//! if it clears the solver's stability check, produces a factorization
//! object exposing determinant/inverse/solve.

pub mod cholesky;
pub mod cholesky_band;
pub mod lu;
pub mod lu_band;
pub mod modified_cholesky;
pub mod modified_cholesky_band;
pub mod qr;
pub mod qr_band;

use crate::error::Result;
use crate::matrix::EntryReadable;

/// Whether a solver judges its input numerically fit to factor.
#[derive(Debug, Clone, PartialEq)]
pub enum Acceptance {
    Accepted,
    Rejected { reason: String },
}

impl Acceptance {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Acceptance::Accepted)
    }

    pub fn rejected(reason: impl Into<String>) -> Acceptance {
        Acceptance::Rejected { reason: reason.into() }
    }
}

/// The contract every direct-factorization solver implements: a stability
/// pre-check (`accepts`) separate from the factorization itself
/// (`execute`), so a caller can probe acceptance without paying for the
/// factorization when it would be rejected.
///
/// `execute` keeps validation and numerical failure distinct: a bad
/// `epsilon` or a shape mismatch is an `Err`, raised synchronously at the
/// call that introduced it; a matrix that passed `accepts` but turns out
/// not to be numerically factorable (singular, not positive definite, not
/// full rank) is reported as `Ok(None)` rather than an error, since it is
/// a property of the input, not a misuse of the API.
pub trait Executor<M: EntryReadable> {
    type Output;

    fn accepts(&self, matrix: &M) -> Acceptance;

    fn execute(&self, matrix: &M, epsilon: f64) -> Result<Option<Self::Output>>;
}
