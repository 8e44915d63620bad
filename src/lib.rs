//! # Kohonen - Self-Organizing Map trainer
//!
//! Kohonen trains Self-Organizing Maps (SOMs): a 2D grid of neurons whose
//! weight vectors learn to cover a high-dimensional input distribution while
//! keeping similar inputs on nearby grid positions.
//!
//! ## Overview
//!
//! Every training iteration takes one input vector, finds its Best Matching
//! Unit (the neuron with the closest weights), and moves every neuron towards
//! the input, weighted by a Gaussian of its grid distance to the BMU. The
//! learning rate and the neighborhood radius decay linearly over a phase, and
//! phases are usually chained coarse-then-fine.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kohonen::{Config, pipeline, storage};
//!
//! let config = Config::load("som.toml")?;
//! let outcome = pipeline::run(&config)?;
//! storage::save(&outcome.grid, &config.output.save_file)?;
//! ```
//!
//! ## Training by hand
//!
//! ```rust,ignore
//! use kohonen::{Grid, MemorySource, SomTrainer, TrainingParams};
//!
//! let mut grid = Grid::new(10, 10, 3)?;
//! grid.equalize(0.5);
//!
//! let mut source = MemorySource::from_text("0.1,0.2,0.3\n0.9,0.8,0.7");
//! let trainer = SomTrainer::new(None);
//! trainer.train_phase(&mut grid, &TrainingParams::default(), &mut source)?;
//! ```
//!
//! ## Architecture
//!
//! - [`som`] - Grid storage, BMU search, neighborhood, annealing, training loop
//! - [`data`] - Line sources, row parsing, cyclic row stream, normalization
//! - [`storage`] - Text persistence of trained grids
//! - [`config`] - Configuration with TOML loading
//! - [`pipeline`] - Config-driven end-to-end training and row mapping

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod som;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, DataConfig, GridConfig, InitMethod, OutputConfig, TrainingParams};
pub use data::{Bounds, CyclicRows, FileSource, LineSource, LineStatus, MemorySource, RowParser};
pub use error::{Result, SomError};
pub use pipeline::{RowMapping, TrainingOutcome};
pub use som::{Grid, PhaseReport, Schedule, SomTrainer};
pub use storage::{GridFormat, GridHeader};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
