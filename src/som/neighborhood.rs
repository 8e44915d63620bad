//! Gaussian neighborhood over grid coordinates.

/// Euclidean distance between two neurons in grid-coordinate space.
///
/// Indices are row-major over a grid with `cols` columns.
#[inline]
pub fn grid_distance(a: usize, b: usize, cols: usize) -> f64 {
    let (ar, ac) = ((a / cols) as f64, (a % cols) as f64);
    let (br, bc) = ((b / cols) as f64, (b % cols) as f64);
    let dr = ar - br;
    let dc = ac - bc;
    (dr * dr + dc * dc).sqrt()
}

/// Isotropic Gaussian kernel with standard deviation `radius`.
///
/// Returns 1 at distance 0 and decays smoothly; there is no cutoff.
#[inline]
pub fn gaussian(distance: f64, radius: f64) -> f64 {
    let x = distance / radius;
    (-0.5 * x * x).exp()
}
