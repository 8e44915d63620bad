//! SOM training loop.
//!
//! Each iteration pulls one vector from a cyclic row stream, optionally
//! normalizes it, finds the Best Matching Unit, and pulls every neuron towards
//! the input with a Gaussian neighborhood. Learning rate and radius decay
//! linearly over the phase. Phases run back to back on the same grid, each
//! starting again from the first row of the source.

use crate::config::TrainingParams;
use crate::data::{Bounds, CyclicRows, LineSource, RowParser};
use crate::error::{Result, SomError};
use crate::som::anneal::Schedule;
use crate::som::Grid;
use log::info;

/// Iterations between progress log lines.
pub const PROGRESS_LOG_INTERVAL: usize = 1000;

/// Summary of one completed training phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    /// 1-based phase number.
    pub phase: usize,
    /// Iterations performed.
    pub iterations: usize,
    /// Times the data source wrapped around.
    pub rewinds: usize,
    /// Empty lines skipped (not counted as iterations).
    pub empty_lines: usize,
    /// Malformed rows skipped (not counted as iterations).
    pub malformed_rows: usize,
    /// Learning rate at the last iteration.
    pub final_learning_rate: f64,
    /// Neighborhood radius at the last iteration.
    pub final_radius: f64,
}

/// SOM trainer for CSV-like row sources.
#[derive(Debug, Clone, Default)]
pub struct SomTrainer {
    excluded_column: Option<usize>,
    bounds: Option<Bounds>,
}

impl SomTrainer {
    /// Creates a trainer that skips `excluded_column` when parsing rows.
    pub fn new(excluded_column: Option<usize>) -> Self {
        Self {
            excluded_column,
            bounds: None,
        }
    }

    /// Normalizes every input into [0, 1] with the given bounds before training on it.
    pub fn with_normalization(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Normalization bounds, if enabled.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Runs one training phase.
    pub fn train_phase<S>(&self, grid: &mut Grid, params: &TrainingParams, source: &mut S) -> Result<PhaseReport>
    where
        S: LineSource + ?Sized,
    {
        self.run_phase(1, grid, params, source, &mut |_, _, _, _| {})
    }

    /// Runs one training phase, calling `on_iteration(iteration, iterations,
    /// learning_rate, radius)` after every iteration.
    pub fn train_phase_with_progress<S, F>(
        &self,
        grid: &mut Grid,
        params: &TrainingParams,
        source: &mut S,
        mut on_iteration: F,
    ) -> Result<PhaseReport>
    where
        S: LineSource + ?Sized,
        F: FnMut(usize, usize, f64, f64),
    {
        self.run_phase(1, grid, params, source, &mut on_iteration)
    }

    /// Runs all phases in order on the same grid.
    ///
    /// The first failing phase aborts the run.
    pub fn train<S>(&self, grid: &mut Grid, phases: &[TrainingParams], source: &mut S) -> Result<Vec<PhaseReport>>
    where
        S: LineSource + ?Sized,
    {
        self.train_with_progress(grid, phases, source, |_, _, _, _, _| {})
    }

    /// Runs all phases, calling `on_iteration(phase, iteration, iterations,
    /// learning_rate, radius)` after every iteration. `phase` is 1-based.
    pub fn train_with_progress<S, F>(
        &self,
        grid: &mut Grid,
        phases: &[TrainingParams],
        source: &mut S,
        mut on_iteration: F,
    ) -> Result<Vec<PhaseReport>>
    where
        S: LineSource + ?Sized,
        F: FnMut(usize, usize, usize, f64, f64),
    {
        if phases.is_empty() {
            return Err(SomError::Training("No training phases provided".to_string()));
        }

        let mut reports = Vec::with_capacity(phases.len());
        for (i, params) in phases.iter().enumerate() {
            let phase = i + 1;
            let mut callback = |it: usize, total: usize, lr: f64, r: f64| on_iteration(phase, it, total, lr, r);
            reports.push(self.run_phase(phase, grid, params, source, &mut callback)?);
        }
        Ok(reports)
    }

    fn run_phase<S>(
        &self,
        phase: usize,
        grid: &mut Grid,
        params: &TrainingParams,
        source: &mut S,
        on_iteration: &mut dyn FnMut(usize, usize, f64, f64),
    ) -> Result<PhaseReport>
    where
        S: LineSource + ?Sized,
    {
        params.validate()?;
        if let Some(bounds) = &self.bounds {
            if bounds.dims() != grid.dims() {
                return Err(SomError::DimensionMismatch {
                    expected: grid.dims(),
                    actual: bounds.dims(),
                });
            }
        }

        let schedule = Schedule::new(*params);
        let iterations = schedule.iterations();
        let mut rows = CyclicRows::new(source, RowParser::new(grid.dims(), self.excluded_column));
        rows.restart()?;

        info!(
            "Phase {}: {} iterations, lr {:.4} -> {:.4}, radius {:.2} -> {:.2}",
            phase,
            iterations,
            params.learn_rate_initial,
            params.learn_rate_final,
            params.radius_initial,
            params.radius_final
        );

        let mut input = Vec::with_capacity(grid.dims());
        let mut lr = params.learn_rate_initial;
        let mut radius = params.radius_initial;

        for iteration in 0..iterations {
            rows.next_into(&mut input)?;
            if let Some(bounds) = &self.bounds {
                bounds.normalize(&mut input)?;
            }

            lr = schedule.learning_rate(iteration);
            radius = schedule.radius(iteration);

            let bmu = grid.find_bmu(&input)?;
            grid.adjust(&input, bmu, lr, radius)?;

            on_iteration(iteration, iterations, lr, radius);

            if iteration % PROGRESS_LOG_INTERVAL == 0 || iteration == iterations - 1 {
                info!(
                    "Phase {} iteration {}/{}: progress {:.1}%, lr={:.4}, radius={:.2}",
                    phase,
                    iteration,
                    iterations,
                    schedule.progress(iteration) * 100.0,
                    lr,
                    radius
                );
            }
        }

        let report = PhaseReport {
            phase,
            iterations,
            rewinds: rows.rewinds(),
            empty_lines: rows.empty_lines(),
            malformed_rows: rows.malformed_rows(),
            final_learning_rate: lr,
            final_radius: radius,
        };

        info!(
            "Phase {} completed: {} rewinds, {} empty lines, {} malformed rows skipped",
            phase, report.rewinds, report.empty_lines, report.malformed_rows
        );
        Ok(report)
    }
}
