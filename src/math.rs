use std::iter::zip;

use rand::{rngs::StdRng, Rng};
use rand_distr::StandardNormal;

pub type Array1D<T> = Vec<T>;
pub type Array2D<T> = Vec<Vec<T>>;
pub type Array3D<T> = Vec<Vec<Vec<T>>>;

/// Matrix-vector product `w · x`.
///
/// Shapes are fixed at network construction, so misalignment here is a
/// programming error rather than a recoverable condition.
pub fn mat_vec(w: &Array2D<f64>, x: &Array1D<f64>) -> Array1D<f64> {
    w.iter()
        .map(|row| {
            if row.len() != x.len() {
                panic!(
                    "shapes ({}, {}) and ({},) not aligned",
                    w.len(),
                    row.len(),
                    x.len()
                )
            }

            zip(row.iter(), x.iter()).map(|(w, x)| w * x).sum()
        })
        .collect()
}

/// Transposed matrix-vector product `wᵀ · d`, computed column-wise so the
/// transpose is never materialised.
pub fn mat_t_vec(w: &Array2D<f64>, d: &Array1D<f64>) -> Array1D<f64> {
    if w.len() != d.len() {
        panic!("shapes ({},)ᵀ and ({},) not aligned", w.len(), d.len())
    }

    let cols = w.first().map(|row| row.len()).unwrap_or(0);
    (0..cols)
        .map(|j| zip(w.iter(), d.iter()).map(|(row, d)| row[j] * d).sum())
        .collect()
}

/// Standard-normal samples scaled by `scale`, drawn from the given RNG so
/// construction stays reproducible for a fixed seed.
pub fn random_array(rng: &mut StdRng, size: usize, scale: f64) -> Array1D<f64> {
    rng.sample_iter::<f64, _>(StandardNormal)
        .take(size)
        .map(|v| v * scale)
        .collect()
}

/// Matrix of standard-normal samples scaled by `scale`.
pub fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, scale: f64) -> Array2D<f64> {
    (0..rows).map(|_| random_array(rng, cols, scale)).collect()
}
