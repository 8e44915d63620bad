//! Self-Organizing Map grid.

use crate::config::InitMethod;
use crate::data::Bounds;
use crate::error::{Result, SomError};
use crate::som::{neighborhood, vector};
use rand::Rng;

/// A 2D grid of neurons, each holding a weight vector in input space.
///
/// All weights live in one contiguous row-major buffer: neuron `n` (at
/// `row * cols + col`) owns `weights[n * dims..(n + 1) * dims]`. The buffer
/// length is fixed at `rows * cols * dims` for the lifetime of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    dims: usize,
    weights: Vec<f64>,
}

impl Grid {
    /// Creates a new grid with zero-initialized weights.
    pub fn new(rows: usize, cols: usize, dims: usize) -> Result<Self> {
        if rows == 0 || cols == 0 || dims == 0 {
            return Err(SomError::Config(format!(
                "grid dimensions must be positive, got {}x{}x{}",
                rows, cols, dims
            )));
        }

        let alloc_err = || SomError::Allocation { rows, cols, dims };
        let len = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(dims))
            .ok_or_else(alloc_err)?;

        let mut weights = Vec::new();
        weights.try_reserve_exact(len).map_err(|_| alloc_err())?;
        weights.resize(len, 0.0);

        Ok(Self {
            rows,
            cols,
            dims,
            weights,
        })
    }

    /// Creates a grid from an existing row-major weight buffer.
    pub fn from_weights(rows: usize, cols: usize, dims: usize, weights: Vec<f64>) -> Result<Self> {
        let mut grid = Self::new(rows, cols, dims)?;
        if weights.len() != grid.weights.len() {
            return Err(SomError::DimensionMismatch {
                expected: grid.weights.len(),
                actual: weights.len(),
            });
        }
        grid.weights = weights;
        Ok(grid)
    }

    /// Number of grid rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Input dimensionality.
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Returns the total number of neurons.
    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns the total number of weights (`rows * cols * dims`).
    #[inline]
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    /// The whole row-major weight buffer.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Gets the weight vector of a neuron by its 1D index.
    pub fn neuron(&self, index: usize) -> Result<&[f64]> {
        self.check_index(index)?;
        let offset = index * self.dims;
        Ok(&self.weights[offset..offset + self.dims])
    }

    /// Gets a mutable view of a neuron's weight vector by its 1D index.
    pub fn neuron_mut(&mut self, index: usize) -> Result<&mut [f64]> {
        self.check_index(index)?;
        let offset = index * self.dims;
        Ok(&mut self.weights[offset..offset + self.dims])
    }

    /// Iterates over all neuron weight vectors in index order.
    pub fn neurons(&self) -> impl Iterator<Item = &[f64]> {
        self.weights.chunks_exact(self.dims)
    }

    /// Iterates mutably over all neuron weight vectors in index order.
    pub fn neurons_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.weights.chunks_exact_mut(self.dims)
    }

    /// Converts a 1D index to 2D coordinates.
    #[inline]
    pub fn index_to_coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Converts 2D coordinates to a 1D index.
    #[inline]
    pub fn coords_to_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        let max = self.neuron_count();
        if index >= max {
            return Err(SomError::IndexOutOfBounds { index, max });
        }
        Ok(())
    }

    #[inline]
    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.dims {
            return Err(SomError::DimensionMismatch {
                expected: self.dims,
                actual: input.len(),
            });
        }
        Ok(())
    }

    /// Sets every weight to `value`.
    pub fn equalize(&mut self, value: f64) {
        self.weights.fill(value);
    }

    /// Draws every weight independently and uniformly from `[min, max]`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, min: f64, max: f64, rng: &mut R) -> Result<()> {
        if min > max || min.is_nan() || max.is_nan() {
            return Err(SomError::Config(format!(
                "uniform min {} exceeds max {}",
                min, max
            )));
        }
        for w in &mut self.weights {
            *w = sample_range(min, max, rng);
        }
        Ok(())
    }

    /// Draws each neuron's weight in dimension `i` uniformly from the
    /// observed data range `[bounds.min[i], bounds.max[i]]`.
    pub fn randomize_within<R: Rng + ?Sized>(&mut self, bounds: &Bounds, rng: &mut R) -> Result<()> {
        if bounds.dims() != self.dims {
            return Err(SomError::DimensionMismatch {
                expected: self.dims,
                actual: bounds.dims(),
            });
        }
        let (mins, maxs) = (bounds.min(), bounds.max());
        for neuron in self.weights.chunks_exact_mut(self.dims) {
            for (i, w) in neuron.iter_mut().enumerate() {
                *w = sample_range(mins[i], maxs[i], rng);
            }
        }
        Ok(())
    }

    /// Applies an initialization strategy.
    ///
    /// [`InitMethod::DataDriven`] needs the data bounds; the other methods ignore them.
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        method: &InitMethod,
        bounds: Option<&Bounds>,
        rng: &mut R,
    ) -> Result<()> {
        match *method {
            InitMethod::Equalize { value } => {
                self.equalize(value);
                Ok(())
            }
            InitMethod::Uniform { min, max } => self.randomize(min, max, rng),
            InitMethod::DataDriven => {
                let bounds = bounds.ok_or_else(|| {
                    SomError::Config("data-driven initialization requires data bounds".into())
                })?;
                self.randomize_within(bounds, rng)
            }
        }
    }

    /// Finds the Best Matching Unit (BMU) for an input vector.
    ///
    /// The BMU is the neuron whose weight vector is closest (Euclidean) to the
    /// input. Ties go to the lowest index.
    pub fn find_bmu(&self, input: &[f64]) -> Result<usize> {
        self.check_input(input)?;

        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;

        for (i, weights) in self.neurons().enumerate() {
            let dist = vector::distance(input, weights);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        Ok(best_idx)
    }

    /// Computes the neighborhood influence of neuron `a` on neuron `b`.
    ///
    /// Uses a Gaussian of their distance in grid coordinates.
    #[inline]
    pub fn neighborhood(&self, a: usize, b: usize, radius: f64) -> f64 {
        neighborhood::gaussian(neighborhood::grid_distance(a, b, self.cols), radius)
    }

    /// Moves every neuron towards the input.
    ///
    /// The step is the BMU's offset to the input, `input - weights(bmu)`,
    /// scaled per neuron by `learning_rate * neighborhood(bmu, n, radius)`.
    pub fn adjust(&mut self, input: &[f64], bmu_idx: usize, learning_rate: f64, radius: f64) -> Result<()> {
        self.check_input(input)?;
        let mut delta = vec![0.0; self.dims];
        vector::difference(self.neuron(bmu_idx)?, input, &mut delta);

        let cols = self.cols;
        for (n, weights) in self.weights.chunks_exact_mut(self.dims).enumerate() {
            let influence =
                neighborhood::gaussian(neighborhood::grid_distance(bmu_idx, n, cols), radius);
            vector::add_scaled(weights, &delta, learning_rate * influence);
        }

        Ok(())
    }
}

#[inline]
fn sample_range<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    if min == max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(3, 4, 5).unwrap();
        assert_eq!(grid.neuron_count(), 12);
        assert_eq!(grid.weight_count(), 60);
        assert_eq!(grid.weights().len(), 60);
        assert!(grid.weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(Grid::new(0, 4, 5), Err(SomError::Config(_))));
        assert!(matches!(Grid::new(4, 4, 0), Err(SomError::Config(_))));
    }

    #[test]
    fn test_overflowing_grid_rejected() {
        let result = Grid::new(usize::MAX, 2, 2);
        assert!(matches!(result, Err(SomError::Allocation { .. })));
    }

    #[test]
    fn test_neuron_views() {
        let mut grid = Grid::new(2, 2, 3).unwrap();
        grid.neuron_mut(2).unwrap().copy_from_slice(&[1.0, 2.0, 3.0]);

        assert_eq!(grid.neuron(2).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(&grid.weights()[6..9], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            grid.neuron(4),
            Err(SomError::IndexOutOfBounds { index: 4, max: 4 })
        ));
    }

    #[test]
    fn test_coordinate_conversion() {
        let grid = Grid::new(3, 4, 1).unwrap();
        assert_eq!(grid.index_to_coords(6), (1, 2));
        assert_eq!(grid.coords_to_index(1, 2), 6);
        assert_eq!(grid.index_to_coords(11), (2, 3));
    }

    #[test]
    fn test_equalize_idempotent() {
        let mut once = Grid::new(3, 3, 2).unwrap();
        once.equalize(0.25);
        let mut twice = once.clone();
        twice.equalize(0.25);
        assert_eq!(once, twice);
        assert!(once.weights().iter().all(|&w| w == 0.25));
    }

    #[test]
    fn test_randomize_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut grid = Grid::new(5, 5, 4).unwrap();
        grid.randomize(-1.0, 1.0, &mut rng).unwrap();

        assert!(grid.weights().iter().all(|&w| (-1.0..=1.0).contains(&w)));
        assert!(grid.weights().iter().any(|&w| w != grid.weights()[0]));
    }

    #[test]
    fn test_randomize_degenerate_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = Grid::new(4, 4, 3).unwrap();
        grid.randomize(5.0, 5.0, &mut rng).unwrap();
        assert!(grid.weights().iter().all(|&w| w == 5.0));
    }

    #[test]
    fn test_randomize_inverted_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = Grid::new(2, 2, 1).unwrap();
        assert!(grid.randomize(1.0, 0.0, &mut rng).is_err());
        assert!(grid.randomize(f64::NAN, 1.0, &mut rng).is_err());
        assert!(grid.randomize(0.0, f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_randomize_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bounds = Bounds::new(vec![0.0, 10.0], vec![1.0, 20.0]).unwrap();
        let mut grid = Grid::new(4, 4, 2).unwrap();
        grid.randomize_within(&bounds, &mut rng).unwrap();

        for neuron in grid.neurons() {
            assert!((0.0..=1.0).contains(&neuron[0]));
            assert!((10.0..=20.0).contains(&neuron[1]));
        }
    }

    #[test]
    fn test_initialize_data_driven_requires_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = Grid::new(2, 2, 2).unwrap();
        assert!(grid.initialize(&InitMethod::DataDriven, None, &mut rng).is_err());
        assert!(grid
            .initialize(&InitMethod::Equalize { value: 3.0 }, None, &mut rng)
            .is_ok());
        assert!(grid.weights().iter().all(|&w| w == 3.0));
    }

    #[test]
    fn test_find_bmu() {
        let mut grid = Grid::new(4, 4, 3).unwrap();
        grid.neuron_mut(5).unwrap().copy_from_slice(&[1.0, 0.0, 0.0]);

        assert_eq!(grid.find_bmu(&[1.0, 0.0, 0.0]).unwrap(), 5);
        assert_eq!(grid.find_bmu(&[0.9, 0.1, 0.0]).unwrap(), 5);
    }

    #[test]
    fn test_find_bmu_tie_breaks_to_lowest_index() {
        let mut grid = Grid::new(3, 3, 2).unwrap();
        grid.equalize(1.0);
        assert_eq!(grid.find_bmu(&[0.0, 0.0]).unwrap(), 0);

        grid.neuron_mut(4).unwrap().copy_from_slice(&[0.5, 0.5]);
        grid.neuron_mut(7).unwrap().copy_from_slice(&[0.5, 0.5]);
        assert_eq!(grid.find_bmu(&[0.5, 0.5]).unwrap(), 4);
    }

    #[test]
    fn test_find_bmu_dimension_mismatch() {
        let grid = Grid::new(2, 2, 3).unwrap();
        assert!(matches!(
            grid.find_bmu(&[1.0, 2.0]),
            Err(SomError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_neighborhood() {
        let grid = Grid::new(8, 8, 1).unwrap();

        for n in 0..grid.neuron_count() {
            assert_eq!(grid.neighborhood(n, n, 2.0), 1.0);
        }

        let near = grid.neighborhood(0, 1, 2.0);
        let far = grid.neighborhood(0, 63, 2.0);
        assert!(far < near);
        assert!(far > 0.0);
    }

    #[test]
    fn test_adjust_single_step() {
        let mut grid = Grid::new(2, 2, 1).unwrap();
        grid.equalize(0.0);

        let bmu = grid.find_bmu(&[1.0]).unwrap();
        assert_eq!(bmu, 0);
        grid.adjust(&[1.0], bmu, 1.0, 1.0).unwrap();

        let adjacent = (-0.5f64).exp();
        let diagonal = (-1.0f64).exp();
        assert_eq!(grid.neuron(0).unwrap()[0], 1.0);
        assert!((grid.neuron(1).unwrap()[0] - adjacent).abs() < 1e-12);
        assert!((grid.neuron(2).unwrap()[0] - adjacent).abs() < 1e-12);
        assert!((grid.neuron(3).unwrap()[0] - diagonal).abs() < 1e-12);
        assert!((grid.neuron(3).unwrap()[0] - 0.3679).abs() < 1e-4);
    }

    #[test]
    fn test_adjust_uses_bmu_delta_for_every_neuron() {
        let mut grid = Grid::new(1, 2, 1).unwrap();
        grid.neuron_mut(0).unwrap()[0] = 0.0;
        grid.neuron_mut(1).unwrap()[0] = 10.0;

        // delta = 1.0 - 0.0 is applied to both neurons, attenuated by distance
        grid.adjust(&[1.0], 0, 0.5, 1.0).unwrap();
        assert_eq!(grid.neuron(0).unwrap()[0], 0.5);
        assert!((grid.neuron(1).unwrap()[0] - (10.0 + 0.5 * (-0.5f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_from_weights() {
        let grid = Grid::from_weights(1, 2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(grid.neuron(1).unwrap(), &[3.0, 4.0]);
        assert!(Grid::from_weights(1, 2, 2, vec![1.0]).is_err());
    }
}
