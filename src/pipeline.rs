//! End-to-end training and mapping driven by a [`Config`].
//!
//! `run` opens the training file, scans bounds when normalization or
//! data-driven initialization needs them, creates (or loads) the grid, runs
//! every phase, and maps the weights back into original units.

use crate::config::{Config, InitMethod};
use crate::data::{denormalize_grid, normalize_grid, Bounds, FileSource, LineSource, LineStatus, RowParser};
use crate::error::{Result, SomError};
use crate::som::{vector, Grid, PhaseReport, SomTrainer};
use crate::storage;
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Result of a full training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The trained grid, in original input units.
    pub grid: Grid,
    /// Data bounds, when they were scanned.
    pub bounds: Option<Bounds>,
    /// One report per completed phase.
    pub reports: Vec<PhaseReport>,
}

/// Creates the initialization RNG, seeded when a seed is configured.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Runs a complete training session.
pub fn run(config: &Config) -> Result<TrainingOutcome> {
    run_with_progress(config, |_, _, _, _, _| {})
}

/// Runs a complete training session, reporting every iteration as
/// `(phase, iteration, iterations, learning_rate, radius)`.
pub fn run_with_progress<F>(config: &Config, on_iteration: F) -> Result<TrainingOutcome>
where
    F: FnMut(usize, usize, usize, f64, f64),
{
    config.validate()?;

    let mut source = FileSource::open(&config.data.train_file)?;
    let parser = RowParser::new(config.grid.dims, config.data.excluded_column);

    let loading = config.output.load_file.is_some();
    let data_driven = !loading && config.init == InitMethod::DataDriven;

    let bounds = if config.data.normalize || data_driven {
        let bounds = Bounds::scan(&mut source, &parser)?;
        info!("Data minima: {:?}", bounds.min());
        info!("Data maxima: {:?}", bounds.max());
        Some(bounds)
    } else {
        None
    };

    let mut grid = match &config.output.load_file {
        Some(path) => {
            let grid = storage::load(path)?;
            if grid.dims() != config.grid.dims {
                return Err(SomError::DimensionMismatch {
                    expected: config.grid.dims,
                    actual: grid.dims(),
                });
            }
            grid
        }
        None => {
            let mut grid = Grid::new(config.grid.rows, config.grid.cols, config.grid.dims)?;
            let mut rng = seeded_rng(config.seed);
            grid.initialize(&config.init, bounds.as_ref(), &mut rng)?;
            info!("Initialized {}x{} SOM with {:?}", grid.rows(), grid.cols(), config.init);
            grid
        }
    };

    let mut trainer = SomTrainer::new(config.data.excluded_column);
    if config.data.normalize {
        if let Some(bounds) = &bounds {
            // Loaded and data-driven grids start out in original units
            if loading || data_driven {
                normalize_grid(&mut grid, bounds)?;
            }
            trainer = trainer.with_normalization(bounds.clone());
        }
    }

    let reports = trainer.train_with_progress(&mut grid, &config.phases, &mut source, on_iteration)?;

    if let Some(bounds) = trainer.bounds() {
        denormalize_grid(&mut grid, bounds)?;
    }

    Ok(TrainingOutcome {
        grid,
        bounds,
        reports,
    })
}

/// Best Matching Unit of one input row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMapping {
    /// 1-based line number of the row in its source.
    pub line: usize,
    /// BMU neuron index.
    pub neuron: usize,
    /// BMU grid row.
    pub row: usize,
    /// BMU grid column.
    pub col: usize,
    /// Euclidean distance from the input to the BMU's weights.
    pub distance: f64,
}

/// Maps every row of a source onto its Best Matching Unit in a trained grid.
///
/// Reads the source once from the start. Empty lines and malformed rows are skipped.
pub fn map_rows<S>(grid: &Grid, source: &mut S, excluded_column: Option<usize>) -> Result<Vec<RowMapping>>
where
    S: LineSource + ?Sized,
{
    let parser = RowParser::new(grid.dims(), excluded_column);
    let mut input = Vec::with_capacity(grid.dims());
    let mut mappings = Vec::new();

    source.restart()?;
    loop {
        let line = match source.next_line() {
            Ok(LineStatus::Line(line)) => line,
            Ok(LineStatus::Empty) => continue,
            Ok(LineStatus::End) => break,
            Err(e) if e.is_recoverable() => {
                warn!("Skipping row: {}", e);
                continue;
            }
            Err(e) => return Err(e),
        };
        let line_no = source.line_number();
        if let Err(e) = parser.parse_into(&line, line_no, &mut input) {
            warn!("Skipping row: {}", e);
            continue;
        }

        let neuron = grid.find_bmu(&input)?;
        let (row, col) = grid.index_to_coords(neuron);
        mappings.push(RowMapping {
            line: line_no,
            neuron,
            row,
            col,
            distance: vector::distance(&input, grid.neuron(neuron)?),
        });
    }

    Ok(mappings)
}
