//! Channel reordering for the time-reversal solver.
//!
//! Forward modelling enumerates detector elements in device order, but the
//! external solver reads recorded channels in the order it traverses the
//! binary sensor mask: ascending (x, y, z) voxel-scan order. The channels
//! must therefore be permuted before the exchange file is written.
//!
//! The ordering key encodes the three coordinates into one scalar,
//! `x * 1e11 + y * 1e5 + z`, relying on a large magnitude gap between the
//! axis weights. This assumes coordinate magnitudes stay below the implied
//! thresholds (z < 1e5, y < 1e6 mm); extreme volumes would order
//! incorrectly. Known latent bound, kept until the solver-side convention
//! is reconfirmed.

use ndarray::{Array2, Axis};

use crate::ReconError;

/// The stable permutation that sorts elements into the solver's
/// mask-traversal order.
pub fn sort_permutation(positions_mm: &[[f64; 3]]) -> Vec<usize> {
    let keys: Vec<f64> = positions_mm
        .iter()
        .map(|p| p[0] * 1e11 + p[1] * 1e5 + p[2])
        .collect();
    let mut indices: Vec<usize> = (0..positions_mm.len()).collect();
    indices.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    indices
}

/// Permute the channel axis of a time-series array into the solver's order.
///
/// Returns a new array; the input is never mutated. Fails if the channel
/// count does not match the number of element positions.
pub fn reorder_time_series(
    time_series: &Array2<f64>,
    positions_mm: &[[f64; 3]],
) -> Result<Array2<f64>, ReconError> {
    if time_series.nrows() != positions_mm.len() {
        return Err(ReconError::ChannelCountMismatch {
            channels: time_series.nrows(),
            elements: positions_mm.len(),
        });
    }
    let permutation = sort_permutation(positions_mm);
    Ok(time_series.select(Axis(0), &permutation))
}
