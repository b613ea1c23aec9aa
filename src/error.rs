//! Error types for the linear-algebra kernel.

use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, LinalgError>;

/// Master error type of this crate.
///
/// Shape/argument validation is raised synchronously at the call that
/// introduced the invalid state. A solver's advance probe
/// ([`crate::solve::Executor::accepts`]) reports acceptance separately, as
/// an [`crate::solve::Acceptance`] rather than a `Result`, so a caller can
/// check fitness without paying for the factorization. A numerical rejection
/// `execute` discovers along the way — non-positive-definite, a singular
/// pivot, a rank-deficient column, no acceptable modified-Cholesky pivot — is
/// never an `Err`: it is a property of the input, not a misuse of the API,
/// and is reported as `Ok(None)` instead (see
/// [`crate::solve::Executor::execute`]).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinalgError {
    /// Matrix is not square where squareness was required.
    #[error("not square: rows({rows}) != cols({cols})")]
    NotSquare { rows: usize, cols: usize },

    /// A `dim()`-incompatible vector or matrix was supplied to an operator.
    #[error("matrix format mismatch: expected {expected}, found {found}")]
    MatrixFormatMismatch { expected: String, found: String },

    /// A solver that requires a `Symmetric` capability was handed a matrix
    /// that does not carry it.
    #[error("matrix is not marked symmetric")]
    MatrixNotSymmetric,

    /// Dense or band storage would exceed the addressable-element cap.
    #[error("too many elements: {rows} x {cols} exceeds the capacity bound")]
    ElementsTooMany { rows: usize, cols: usize },

    /// A builder or accessor index fell outside the valid/support region.
    #[error("index out of bounds: {index} not in [0, {bound})")]
    IndexOutOfBounds { index: usize, bound: usize },

    /// Any other invalid argument: a bad epsilon, an unequal-norm or
    /// zero-norm reflection vector pair, a call on an already-built builder,
    /// and so on.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// A required argument was absent where one was mandatory.
    #[error("null argument: {0}")]
    NullArgument(&'static str),
}

impl LinalgError {
    pub fn format_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        LinalgError::MatrixFormatMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
