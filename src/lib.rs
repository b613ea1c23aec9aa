//! A dense and banded linear-algebra kernel: matrix representations over a
//! shared [`matrix::Matrix`] operator interface, and the direct
//! factorization solvers built on top of them — LU with partial pivoting,
//! Cholesky, modified (pivoted) Cholesky for symmetric indefinite systems,
//! and Householder QR, each in a dense and a banded variant.
//!
//! Modules
//! -----------------------
//! - [`vector`] — the dense column vector type every operator accepts and
//!   returns.
//! - [`dim`] — the dimension types (`MatrixDim`, `VectorDim`, `BandDim`)
//!   that every constructor validates against.
//! - [`det`] — `DeterminantValue`, the sign/log-magnitude pair every
//!   [`matrix::Determinantable`] type reports.
//! - [`matrix`] — the concrete matrix representations (dense, banded,
//!   triangular, diagonal, permutation, Householder, block-diagonal,
//!   products) and the capability traits (`Symmetric`, `Orthogonal`,
//!   `Invertible`, `Determinantable`, `Band`, ...) that classify them.
//! - [`solve`] — the factorization solvers, each an [`solve::Executor`]
//!   that turns an [`matrix::EntryReadable`] matrix into a factorization
//!   object.
//! - [`sparse_vector`] — a capability trait plus the local-run
//!   implementation solvers reach for when a vector's nonzero entries are
//!   known to be confined to a contiguous window.
//!
//! Naming Convention
//! -----------------------
//! Each solver lives in its own module under [`solve`] and exposes an
//! `executor()` constructor for its `Executor` impl plus the factorization
//! type `execute` returns; the dense and banded variant of a solver are
//! separate modules (e.g. [`solve::cholesky`] and [`solve::cholesky_band`])
//! rather than one type branching on storage at runtime.
//!
//! Error handling
//! -----------------------
//! Argument and shape validation is reported through [`error::LinalgError`]
//! at the call that introduced the invalid state. Numerical failure to
//! factor — singular, not positive definite, not full rank, no acceptable
//! pivot — is a property of the input, not a misuse of the API, and is
//! reported as `Ok(None)` from [`solve::Executor::execute`] rather than an
//! `Err`; [`solve::Acceptance`] is only the pre-check `accepts` runs before
//! paying for the factorization.

#![deny(rustdoc::broken_intra_doc_links, rustdoc::private_intra_doc_links)]

pub mod config;
pub mod det;
pub mod dim;
pub mod error;
pub mod matrix;
pub mod solve;
pub mod sparse_vector;
pub mod util;
pub mod vector;

pub use crate::det::DeterminantValue;
pub use crate::dim::{BandDim, MatrixDim, VectorDim};
pub use crate::error::{LinalgError, Result};
pub use crate::matrix::{
    Band, Determinantable, Diagonal, EntryReadable, HouseholderReflector, Invertible, LowerUnitriangular, Matrix,
    Orthogonal, Permutation, Signature, Symmetric,
};
pub use crate::solve::{Acceptance, Executor};
pub use crate::sparse_vector::{LocalSparseVector, SparseVector};
pub use crate::vector::Vector;
