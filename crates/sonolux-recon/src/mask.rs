//! Sensor-mask rasterization and acoustic property gathering.
//!
//! Continuous detector positions (mm) are mapped onto the simulation grid as
//! a binary sensor mask the wave solver uses to know where to record and
//! inject pressure. Acoustic property maps persisted by the forward stage
//! are loaded and rotated into the axis convention the solver expects.

use std::collections::BTreeMap;

use ndarray::{Array2, Array3, ArrayD, Axis};

use sonolux_core::store::{FieldStore, StoreError};
use sonolux_core::types::AcousticProperty;

use crate::ReconError;

/// Rasterize detector element positions into a binary sensor mask.
///
/// Voxel index = `round(position / spacing)`, offset by +1 on each used axis
/// to reserve a one-voxel boundary margin. The 2D mask is (depth, lateral) =
/// (z, x); the 3D mask is (z, y, x). Multiple elements mapping to the same
/// voxel collapse silently; this is a known precision limitation of the
/// discretisation, not an error. An element mapping outside the grid is a
/// configuration error.
pub fn rasterize_sensor_mask(
    positions_global_mm: &[[f64; 3]],
    spacing_mm: f64,
    dims_voxels: [usize; 3],
    three_dimensional: bool,
) -> Result<ArrayD<f64>, ReconError> {
    let [x_dim, y_dim, z_dim] = dims_voxels;

    let voxels: Vec<[i64; 3]> = positions_global_mm
        .iter()
        .map(|p| {
            [
                (p[0] / spacing_mm).round() as i64 + 1,
                (p[1] / spacing_mm).round() as i64 + 1,
                (p[2] / spacing_mm).round() as i64 + 1,
            ]
        })
        .collect();

    let check = |element: usize, voxel: [i64; 3], index: i64, dim: usize| {
        if index < 0 || index >= dim as i64 {
            Err(ReconError::SensorOutsideVolume {
                element,
                voxel,
                dims: dims_voxels,
            })
        } else {
            Ok(index as usize)
        }
    };

    if three_dimensional {
        let mut mask = Array3::<f64>::zeros((z_dim, y_dim, x_dim));
        for (element, &voxel) in voxels.iter().enumerate() {
            let z = check(element, voxel, voxel[2], z_dim)?;
            let y = check(element, voxel, voxel[1], y_dim)?;
            let x = check(element, voxel, voxel[0], x_dim)?;
            mask[[z, y, x]] = 1.0;
        }
        Ok(mask.into_dyn())
    } else {
        let mut mask = Array2::<f64>::zeros((z_dim, x_dim));
        for (element, &voxel) in voxels.iter().enumerate() {
            let z = check(element, voxel, voxel[2], z_dim)?;
            let x = check(element, voxel, voxel[0], x_dim)?;
            mask[[z, x]] = 1.0;
        }
        Ok(mask.into_dyn())
    }
}

/// Rotate an array by `quarter_turns` × 90° in the plane spanned by `axes`.
///
/// Matches the numpy `rot90` convention: one quarter turn reverses the
/// second axis and then swaps the two axes.
pub fn rot90(volume: &ArrayD<f64>, quarter_turns: usize, axes: (usize, usize)) -> ArrayD<f64> {
    let mut view = volume.view();
    for _ in 0..(quarter_turns % 4) {
        view.invert_axis(Axis(axes.1));
        view.swap_axes(axes.0, axes.1);
    }
    view.to_owned()
}

/// Load the acoustic property maps the solver consumes and rotate them 270°
/// into its axis convention.
///
/// Rotation is about axes (0, 1) for a 2D acoustic model and (0, 2) for 3D.
/// A property missing from the store is skipped with a logged warning; any
/// other store failure propagates.
pub fn gather_acoustic_properties(
    store: &dyn FieldStore,
    wavelength_nm: f64,
    three_dimensional: bool,
) -> Result<BTreeMap<String, ArrayD<f64>>, ReconError> {
    let axes = if three_dimensional { (0, 2) } else { (0, 1) };
    let mut properties = BTreeMap::new();

    for property in AcousticProperty::ALL {
        let field = property.field_name();
        match store.load(field, wavelength_nm) {
            Ok(volume) => {
                if volume.ndim() <= axes.1 {
                    log::error!(
                        "{field} has {} dimensions, cannot rotate about axes {axes:?}",
                        volume.ndim()
                    );
                    continue;
                }
                properties.insert(field.to_string(), rot90(&volume, 3, axes));
            }
            Err(StoreError::FieldNotFound { .. }) => {
                log::warn!("{field} not specified.");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use sonolux_core::store::MemoryFieldStore;
    use sonolux_core::types::fields;

    #[test]
    fn test_2d_mask_marks_offset_voxels() {
        let positions = [[1.0, 0.0, 2.0], [3.0, 0.0, 2.0]];
        let mask = rasterize_sensor_mask(&positions, 1.0, [10, 1, 8], false).unwrap();
        assert_eq!(mask.shape(), &[8, 10]);
        // Hot voxels at (z+1, x+1).
        assert_eq!(mask[[3, 2]], 1.0);
        assert_eq!(mask[[3, 4]], 1.0);
        assert_eq!(mask.sum(), 2.0);
    }

    #[test]
    fn test_3d_mask_shape_and_padding() {
        let positions = [[0.5, 1.0, 1.5]];
        let mask = rasterize_sensor_mask(&positions, 0.5, [6, 5, 7], true).unwrap();
        assert_eq!(mask.shape(), &[7, 5, 6]);
        // round(1.5/0.5)+1 = 4, round(1.0/0.5)+1 = 3, round(0.5/0.5)+1 = 2
        assert_eq!(mask[[4, 3, 2]], 1.0);
        assert_eq!(mask.sum(), 1.0);
    }

    #[test]
    fn test_rasterization_is_idempotent() {
        let positions: Vec<[f64; 3]> = (0..32)
            .map(|i| [i as f64 * 0.5, 0.0, 10.0])
            .collect();
        let a = rasterize_sensor_mask(&positions, 0.5, [40, 1, 30], false).unwrap();
        let b = rasterize_sensor_mask(&positions, 0.5, [40, 1, 30], false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_colliding_elements_collapse() {
        let positions = [[1.0, 0.0, 1.0], [1.1, 0.0, 1.0]];
        let mask = rasterize_sensor_mask(&positions, 1.0, [5, 1, 5], false).unwrap();
        assert_eq!(mask.sum(), 1.0);
    }

    #[test]
    fn test_out_of_grid_element_rejected() {
        let positions = [[9.5, 0.0, 1.0]];
        let err = rasterize_sensor_mask(&positions, 1.0, [10, 1, 5], false).unwrap_err();
        assert!(matches!(err, ReconError::SensorOutsideVolume { element: 0, .. }));
    }

    #[test]
    fn test_negative_position_rejected() {
        // round(-2.0) + 1 = -1 lands below the grid.
        let positions = [[-2.0, 0.0, 1.0]];
        assert!(rasterize_sensor_mask(&positions, 1.0, [10, 1, 5], false).is_err());
    }

    #[test]
    fn test_rot90_matches_numpy_single_turn() {
        let m = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        // np.rot90([[1,2],[3,4]]) == [[2,4],[1,3]]
        let r = rot90(&m, 1, (0, 1));
        assert_eq!(r, array![[2.0, 4.0], [1.0, 3.0]].into_dyn());
    }

    #[test]
    fn test_rot90_three_turns() {
        let m = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        // np.rot90(m, 3) == [[3,1],[4,2]]
        let r = rot90(&m, 3, (0, 1));
        assert_eq!(r, array![[3.0, 1.0], [4.0, 2.0]].into_dyn());
    }

    #[test]
    fn test_rot90_four_turns_is_identity() {
        let m = ArrayD::from_shape_fn(ndarray::IxDyn(&[3, 4, 2]), |ix| {
            (ix[0] * 8 + ix[1] * 2 + ix[2]) as f64
        });
        assert_eq!(rot90(&m, 4, (0, 2)), m);
    }

    #[test]
    fn test_gather_skips_missing_properties() {
        let store = MemoryFieldStore::new();
        let sos = array![[1500.0, 1510.0], [1520.0, 1530.0]].into_dyn();
        store.save(&sos, fields::SPEED_OF_SOUND, 800.0).unwrap();

        let properties = gather_acoustic_properties(&store, 800.0, false).unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(
            properties[fields::SPEED_OF_SOUND],
            rot90(&sos, 3, (0, 1))
        );
    }
}
