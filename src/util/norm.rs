//! Overflow-safe norm helpers shared by `Vector` and the entry-readable
//! matrix types.
//!
//! Both the 2-norm and the log-determinant accumulation must avoid
//! overflow/underflow on extreme inputs, so every sum of squares here is
//! computed by first factoring out the array's max-magnitude element
//! (a Blue-like rescaling) rather than accumulating raw squares.

/// `max_i |x_i|`, or `0.0` for an empty slice.
pub fn max_abs(xs: &[f64]) -> f64 {
    xs.iter().fold(0.0_f64, |m, &x| m.max(x.abs()))
}

/// `sum_i |x_i|`.
pub fn sum_abs(xs: &[f64]) -> f64 {
    xs.iter().fold(0.0_f64, |s, &x| s + x.abs())
}

/// Euclidean norm `sqrt(sum x_i^2)`, computed by rescaling through the
/// precomputed maximum magnitude `scale` so that neither overflow (very
/// large entries) nor underflow (subnormal-only vectors) corrupts the
/// cumulative sum.
///
/// When `scale == 0.0` every entry is zero and the norm is exactly `0.0`.
pub fn scaled_euclidean_norm(xs: &[f64], scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = xs
        .iter()
        .map(|&x| {
            let r = x / scale;
            r * r
        })
        .sum();
    scale * sum_sq.sqrt()
}

/// `sum x_i^2`, rescaled the same way as [`scaled_euclidean_norm`] but
/// without taking the final square root (used where the squared norm is
/// wanted directly, e.g. to avoid a redundant `sqrt`/`powi(2)` round trip).
pub fn scaled_euclidean_norm_square(xs: &[f64], scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = xs
        .iter()
        .map(|&x| {
            let r = x / scale;
            r * r
        })
        .sum();
    scale * scale * sum_sq
}
