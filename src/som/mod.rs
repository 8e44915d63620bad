//! Self-Organizing Map (SOM) core.
//!
//! - **Grid**: flat weight storage, initialization, BMU search and updates (grid.rs)
//! - **Annealing**: linear learning-rate and radius schedules (anneal.rs)
//! - **Neighborhood**: Gaussian falloff over grid coordinates (neighborhood.rs)
//! - **Training**: the phase loop over a cyclic data stream (training.rs)

pub mod anneal;
mod grid;
pub mod neighborhood;
pub mod training;
pub mod vector;

pub use anneal::Schedule;
pub use grid::Grid;
pub use training::{PhaseReport, SomTrainer, PROGRESS_LOG_INTERVAL};
