//! Thread-safe lazy-once cache supplier.
//!
//! Used by every matrix/factorization type that caches a derived value
//! (transpose companion, inverse object, precomputed norm) on first access.
//! Backed by `std::sync::OnceLock`, which already gives the double-checked
//! initialization the concurrency model requires: concurrent callers either
//! observe the cached value or race to compute it, and exactly one
//! computation wins.

use std::sync::OnceLock;

#[derive(Debug, Default)]
pub struct LazyCache<T>(OnceLock<T>);

impl<T> LazyCache<T> {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the cached value, computing it with `init` on first access.
    /// `init` must be a pure function of the owning instance's state.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(init)
    }

    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }
}
