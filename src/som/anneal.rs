//! Learning-rate and radius annealing.
//!
//! Both hyperparameters decay linearly from their initial to their final value
//! as a phase progresses from its first to its last iteration.

use crate::config::TrainingParams;

/// Linearly interpolates between `start` and `end`.
///
/// `progress` 0 returns `start` and 1 returns `end`, both exactly.
#[inline]
pub fn blend(start: f64, end: f64, progress: f64) -> f64 {
    if progress == 1.0 {
        // start + (end - start) can round away from end
        return end;
    }
    start + (end - start) * progress
}

/// Inverse of [`blend`]: the progress at which `value` lies between `start` and `end`.
///
/// Returns 0 when `start == end`, so a constant dimension maps to 0 instead of NaN.
#[inline]
pub fn progress_for(start: f64, end: f64, value: f64) -> f64 {
    let span = end - start;
    if span == 0.0 {
        return 0.0;
    }
    (value - start) / span
}

/// Fraction of a phase completed at `iteration` (0-based).
///
/// A single-iteration phase is always at progress 0.
#[inline]
pub fn progress(iteration: usize, iterations: usize) -> f64 {
    if iterations <= 1 {
        0.0
    } else {
        iteration as f64 / (iterations - 1) as f64
    }
}

/// Per-iteration learning rate and radius for one training phase.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    params: TrainingParams,
}

impl Schedule {
    /// Creates a schedule for the given phase parameters.
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    /// Number of iterations in the phase.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.params.iterations
    }

    /// Progress fraction at an iteration.
    #[inline]
    pub fn progress(&self, iteration: usize) -> f64 {
        progress(iteration, self.params.iterations)
    }

    /// Learning rate at an iteration.
    #[inline]
    pub fn learning_rate(&self, iteration: usize) -> f64 {
        blend(
            self.params.learn_rate_initial,
            self.params.learn_rate_final,
            self.progress(iteration),
        )
    }

    /// Neighborhood radius at an iteration.
    #[inline]
    pub fn radius(&self, iteration: usize) -> f64 {
        blend(
            self.params.radius_initial,
            self.params.radius_final,
            self.progress(iteration),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> TrainingParams {
        TrainingParams {
            iterations: 11,
            learn_rate_initial: 0.1,
            learn_rate_final: 0.01,
            radius_initial: 5.0,
            radius_final: 2.0,
        }
    }

    #[test]
    fn test_blend_endpoints_exact() {
        for &(a, b) in &[(0.1, 0.01), (5.0, 2.0), (-3.7, 1e9), (0.3, 0.3)] {
            assert_eq!(blend(a, b, 0.0), a);
            assert_eq!(blend(a, b, 1.0), b);
        }
        assert_eq!(blend(0.0, 10.0, 0.25), 2.5);
    }

    #[test]
    fn test_progress_for_inverts_blend() {
        let p = progress_for(2.0, 6.0, blend(2.0, 6.0, 0.75));
        assert!((p - 0.75).abs() < 1e-12);
        assert_eq!(progress_for(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(0, 1), 0.0);
        assert_eq!(progress(0, 5), 0.0);
        assert_eq!(progress(2, 5), 0.5);
        assert_eq!(progress(4, 5), 1.0);
    }

    #[test]
    fn test_learning_rate_decay() {
        let schedule = Schedule::new(test_params());

        assert_eq!(schedule.learning_rate(0), 0.1);
        assert_eq!(schedule.learning_rate(10), 0.01);
        assert!((schedule.learning_rate(5) - 0.055).abs() < 1e-12);
    }

    #[test]
    fn test_radius_decay() {
        let schedule = Schedule::new(test_params());

        assert_eq!(schedule.radius(0), 5.0);
        assert_eq!(schedule.radius(10), 2.0);
        assert!(schedule.radius(3) < schedule.radius(2));
    }

    #[test]
    fn test_single_iteration_uses_initial_values() {
        let params = TrainingParams {
            iterations: 1,
            ..test_params()
        };
        let schedule = Schedule::new(params);
        assert_eq!(schedule.learning_rate(0), 0.1);
        assert_eq!(schedule.radius(0), 5.0);
    }
}
