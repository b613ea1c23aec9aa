//! Determinant value triple and the inverse/determinant bundle solvers hand
//! back to callers.

/// `(sign, log|det|, det)`, kept mutually consistent: when `sign != 0`,
/// `det == sign * exp(log_abs)`; a singular factor degrades cleanly to
/// `sign == 0`, `log_abs == -inf`, `det == 0.0`.
///
/// Products of many pivots are composed via [`DeterminantValue::combine`]
/// rather than multiplying raw determinants together, so that a long chain
/// of factors (e.g. one per LU pivot) cannot overflow or underflow even when
/// individual pivots are extreme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeterminantValue {
    sign: i32,
    log_abs: f64,
}

impl DeterminantValue {
    pub fn new(sign: i32, log_abs: f64) -> Self {
        debug_assert!(sign == -1 || sign == 0 || sign == 1);
        if sign == 0 {
            DeterminantValue {
                sign: 0,
                log_abs: f64::NEG_INFINITY,
            }
        } else {
            DeterminantValue { sign, log_abs }
        }
    }

    /// The determinant value contributed by a single real pivot/eigenvalue.
    pub fn of_scalar(x: f64) -> Self {
        if x == 0.0 {
            Self::singular()
        } else {
            Self::new(if x > 0.0 { 1 } else { -1 }, x.abs().ln())
        }
    }

    pub fn singular() -> Self {
        DeterminantValue {
            sign: 0,
            log_abs: f64::NEG_INFINITY,
        }
    }

    pub fn identity() -> Self {
        DeterminantValue {
            sign: 1,
            log_abs: 0.0,
        }
    }

    pub fn sign(&self) -> i32 {
        self.sign
    }

    pub fn log_abs_determinant(&self) -> f64 {
        self.log_abs
    }

    pub fn determinant(&self) -> f64 {
        if self.sign == 0 {
            0.0
        } else {
            self.sign as f64 * self.log_abs.exp()
        }
    }

    /// Determinant of a product, composed additively in log-space so a long
    /// chain of pivot contributions cannot overflow.
    pub fn combine(&self, other: &DeterminantValue) -> DeterminantValue {
        if self.sign == 0 || other.sign == 0 {
            return Self::singular();
        }
        DeterminantValue {
            sign: self.sign * other.sign,
            log_abs: self.log_abs + other.log_abs,
        }
    }
}

impl Default for DeterminantValue {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::iter::FromIterator<DeterminantValue> for DeterminantValue {
    fn from_iter<I: IntoIterator<Item = DeterminantValue>>(iter: I) -> Self {
        iter.into_iter().fold(Self::identity(), |acc, x| acc.combine(&x))
    }
}
