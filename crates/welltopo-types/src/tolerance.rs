//! Tolerance-comparison utilities.
//!
//! Every "near enough" depth or radius comparison in the resolver goes through
//! these helpers with one of the per-domain constants below, so tie-break and
//! boundary-matching behavior stays consistent across modules.

/// Near-equality epsilon for depth values: dedup of critical depths and
/// boundary-reason probing.
pub const DEPTH_EPSILON: f64 = 1e-6;

/// Tolerance for classifying a pipe-to-pipe join as a swage (tight) rather
/// than a crossover (gapped).
pub const BOUNDARY_TOLERANCE: f64 = 0.1;

/// Offset used when probing "just inside" a row's top depth.
pub const PROBE_OFFSET: f64 = 1e-3;

/// Near-equality epsilon for radial values (radii and diameters).
pub const RADIAL_EPSILON: f64 = 1e-9;

/// `true` when `a` and `b` differ by no more than `eps`.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// `true` when `value` lies in `[top, bottom]` widened by `eps` on both ends.
pub fn within_range(value: f64, top: f64, bottom: f64, eps: f64) -> bool {
    value >= top - eps && value <= bottom + eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_within_epsilon() {
        assert!(approx_eq(5000.0, 5000.0, DEPTH_EPSILON));
        assert!(approx_eq(5000.0, 5000.0 + 5e-7, DEPTH_EPSILON));
        assert!(!approx_eq(5000.0, 5000.01, DEPTH_EPSILON));
    }

    #[test]
    fn within_range_inclusive_with_slack() {
        assert!(within_range(100.0, 100.0, 200.0, DEPTH_EPSILON));
        assert!(within_range(200.0, 100.0, 200.0, DEPTH_EPSILON));
        assert!(within_range(100.0 - 5e-7, 100.0, 200.0, DEPTH_EPSILON));
        assert!(!within_range(99.9, 100.0, 200.0, DEPTH_EPSILON));
        assert!(!within_range(200.1, 100.0, 200.0, DEPTH_EPSILON));
    }
}
