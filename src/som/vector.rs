//! Elementary vector operations shared by the grid and the trainer.
//!
//! All functions take equal-length slices; lengths are checked with
//! `debug_assert_eq!` only, callers validate dimensionality at the boundary.

/// Computes the Euclidean distance between two vectors.
#[inline]
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Computes the squared Euclidean distance (avoids sqrt).
#[inline]
pub fn distance_squared(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Writes `to - from` into `out`.
#[inline]
pub fn difference(from: &[f64], to: &[f64], out: &mut [f64]) {
    debug_assert_eq!(from.len(), to.len());
    debug_assert_eq!(from.len(), out.len());

    for ((o, f), t) in out.iter_mut().zip(from).zip(to) {
        *o = t - f;
    }
}

/// Multiplies every component of `v` by `c` in place.
#[inline]
pub fn scale(v: &mut [f64], c: f64) {
    for x in v {
        *x *= c;
    }
}

/// Adds `other` to `acc` component-wise.
#[inline]
pub fn add(acc: &mut [f64], other: &[f64]) {
    debug_assert_eq!(acc.len(), other.len());

    for (a, o) in acc.iter_mut().zip(other) {
        *a += o;
    }
}

/// Adds `c * other` to `acc` component-wise.
#[inline]
pub fn add_scaled(acc: &mut [f64], other: &[f64], c: f64) {
    debug_assert_eq!(acc.len(), other.len());

    for (a, o) in acc.iter_mut().zip(other) {
        *a += c * o;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert!((distance(&a, &b) - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(distance(&a, &a), 0.0);
        assert_eq!(distance_squared(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_difference() {
        let mut out = [0.0; 3];
        difference(&[1.0, 2.0, 3.0], &[2.0, 2.0, 0.0], &mut out);
        assert_eq!(out, [1.0, 0.0, -3.0]);
    }

    #[test]
    fn test_scale_and_add() {
        let mut v = [1.0, -2.0];
        scale(&mut v, 3.0);
        assert_eq!(v, [3.0, -6.0]);

        add(&mut v, &[1.0, 1.0]);
        assert_eq!(v, [4.0, -5.0]);

        add_scaled(&mut v, &[2.0, 4.0], 0.5);
        assert_eq!(v, [5.0, -3.0]);
    }
}
