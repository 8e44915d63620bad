//! Configuration for the Kohonen SOM trainer.
//!
//! Every knob lives in one immutable [`Config`] tree that is built once (from
//! defaults, a TOML file, and CLI overrides) and then passed by reference into
//! the training entry points.

use crate::error::{Result, SomError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Random seed for reproducible initialization.
    /// Default: None (seeded from entropy).
    pub seed: Option<u64>,

    /// Grid shape.
    pub grid: GridConfig,

    /// Training data source settings.
    pub data: DataConfig,

    /// Weight initialization strategy.
    pub init: InitMethod,

    /// Ordered training phases, applied to the same grid one after another.
    /// Default: two phases (coarse, then fine) with default parameters.
    pub phases: Vec<TrainingParams>,

    /// Where the trained grid is written, and optionally read from.
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            grid: GridConfig::default(),
            data: DataConfig::default(),
            init: InitMethod::default(),
            phases: vec![TrainingParams::default(), TrainingParams::default()],
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SomError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SomError::Config(e.to_string()))
    }

    /// Checks every invariant the trainer relies on.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.init.validate()?;

        if self.phases.is_empty() {
            return Err(SomError::Config("at least one training phase is required".into()));
        }
        for (i, phase) in self.phases.iter().enumerate() {
            phase
                .validate()
                .map_err(|e| SomError::Config(format!("phase {}: {}", i + 1, e)))?;
        }

        if let Some(col) = self.data.excluded_column {
            // The excluded column sits among dims + 1 columns at most.
            if col > self.grid.dims {
                return Err(SomError::Config(format!(
                    "excluded column {} is past the last column of a {}-dimensional row",
                    col, self.grid.dims
                )));
            }
        }

        Ok(())
    }
}

/// Grid shape configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of grid rows.
    /// Default: 10.
    pub rows: usize,

    /// Number of grid columns.
    /// Default: 10.
    pub cols: usize,

    /// Dimensionality of the input vectors and neuron weights.
    /// Default: 3.
    pub dims: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            dims: 3,
        }
    }
}

impl GridConfig {
    /// Returns the total number of neurons in the grid.
    #[inline]
    pub fn total_neurons(&self) -> usize {
        self.rows * self.cols
    }

    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.dims == 0 {
            return Err(SomError::Config(format!(
                "grid dimensions must be positive, got {}x{}x{}",
                self.rows, self.cols, self.dims
            )));
        }
        Ok(())
    }
}

/// Training data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV-like training file, one vector per line.
    /// Default: "data/default_train_file.txt".
    pub train_file: PathBuf,

    /// Column ignored when parsing rows (typically a class label).
    /// Default: None.
    pub excluded_column: Option<usize>,

    /// Rescale inputs into [0, 1] per dimension during training.
    /// Default: true.
    pub normalize: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_file: PathBuf::from("data/default_train_file.txt"),
            excluded_column: None,
            normalize: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File the trained grid is saved to.
    /// Default: "trained/default_save_file.som".
    pub save_file: PathBuf,

    /// Previously saved grid to continue training from. Skips initialization.
    /// Default: None.
    pub load_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_file: PathBuf::from("trained/default_save_file.som"),
            load_file: None,
        }
    }
}

/// Weight initialization strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InitMethod {
    /// Every weight set to the same value.
    Equalize {
        /// The value assigned to every weight.
        value: f64,
    },
    /// Every weight drawn uniformly from `[min, max]`.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Each dimension drawn uniformly from the range observed in the data.
    #[default]
    DataDriven,
}

impl InitMethod {
    fn validate(&self) -> Result<()> {
        match *self {
            InitMethod::Equalize { value } if !value.is_finite() => Err(SomError::Config(
                format!("equalize value must be finite, got {}", value),
            )),
            InitMethod::Uniform { min, max } if !min.is_finite() || !max.is_finite() => {
                Err(SomError::Config(format!(
                    "uniform bounds must be finite, got [{}, {}]",
                    min, max
                )))
            }
            InitMethod::Uniform { min, max } if min > max => Err(SomError::Config(format!(
                "uniform min {} exceeds max {}",
                min, max
            ))),
            _ => Ok(()),
        }
    }
}

/// Hyperparameters of one training phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Number of iterations (one input vector each).
    /// Default: 1000.
    pub iterations: usize,

    /// Learning rate at the first iteration.
    /// Default: 0.10.
    pub learn_rate_initial: f64,

    /// Learning rate at the last iteration.
    /// Default: 0.01.
    pub learn_rate_final: f64,

    /// Neighborhood radius at the first iteration, in grid units.
    /// Default: 5.0.
    pub radius_initial: f64,

    /// Neighborhood radius at the last iteration, in grid units.
    /// Default: 2.0.
    pub radius_final: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            iterations: 1000,
            learn_rate_initial: 0.10,
            learn_rate_final: 0.01,
            radius_initial: 5.0,
            radius_final: 2.0,
        }
    }
}

impl TrainingParams {
    /// Checks that the schedule is usable.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SomError::Config("iterations must be positive".into()));
        }
        if !self.learn_rate_initial.is_finite() || !self.learn_rate_final.is_finite() {
            return Err(SomError::Config(format!(
                "learn rates must be finite, got {} -> {}",
                self.learn_rate_initial, self.learn_rate_final
            )));
        }
        let radius_ok = |r: f64| r.is_finite() && r > 0.0;
        if !radius_ok(self.radius_initial) || !radius_ok(self.radius_final) {
            return Err(SomError::Config(format!(
                "radii must be positive and finite, got {} -> {}",
                self.radius_initial, self.radius_final
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.grid.total_neurons(), 100);
        assert_eq!(config.grid.dims, 3);
        assert_eq!(config.phases.len(), 2);
        assert_eq!(config.init, InitMethod::DataDriven);
        assert!(config.data.normalize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            seed = 7

            [grid]
            rows = 4
            cols = 6

            [data]
            train_file = "iris.csv"
            excluded_column = 3

            [init]
            method = "uniform"
            min = -1.0
            max = 1.0

            [[phases]]
            iterations = 50
            radius_initial = 3.0

            [[phases]]
            iterations = 200
            learn_rate_initial = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.grid.rows, 4);
        assert_eq!(config.grid.cols, 6);
        assert_eq!(config.grid.dims, 3);
        assert_eq!(config.data.excluded_column, Some(3));
        assert_eq!(config.init, InitMethod::Uniform { min: -1.0, max: 1.0 });
        assert_eq!(config.phases.len(), 2);
        assert_eq!(config.phases[0].iterations, 50);
        assert_eq!(config.phases[0].radius_initial, 3.0);
        assert_eq!(config.phases[0].radius_final, 2.0);
        assert_eq!(config.phases[1].learn_rate_initial, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.seed = Some(42);
        config.init = InitMethod::Equalize { value: 0.5 };
        config.data.excluded_column = Some(1);

        let text = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/som.toml");
        match result {
            Err(SomError::SourceUnavailable { path, source }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/som.toml"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[grid]\nrows = \"many\"");
        assert!(matches!(result, Err(SomError::ConfigParse(_))));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.grid.cols = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.phases.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.phases[1].iterations = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.phases[0].radius_final = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.init = InitMethod::Uniform { min: 2.0, max: 1.0 };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data.excluded_column = Some(9);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_uniform_bounds_are_valid() {
        let mut config = Config::default();
        config.init = InitMethod::Uniform { min: 5.0, max: 5.0 };
        assert!(config.validate().is_ok());
    }
}
