//! Storage module for persisting trained grids.

mod format;

pub use format::{GridFormat, GridHeader, DEFAULT_PRECISION};

use crate::error::Result;
use crate::som::Grid;
use log::info;
use std::path::Path;

/// Saves a grid in the default text format.
pub fn save<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    GridFormat::default().write(grid, path.as_ref())?;
    info!("Saved SOM to {}", path.as_ref().display());
    Ok(())
}

/// Loads a grid saved with [`save`].
pub fn load<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let grid = GridFormat::default().read(path.as_ref())?;
    info!(
        "Loaded {}x{}x{} SOM from {}",
        grid.rows(),
        grid.cols(),
        grid.dims(),
        path.as_ref().display()
    );
    Ok(grid)
}
