//! Image cropping for reconstruction preprocessing.
//!
//! Reconstructed or raw images are cropped to remove coupling layers (air,
//! gel pad) above the tissue and optionally shrunk to power-of-two
//! dimensions for FFT-friendly downstream processing. Row 0 is the top of
//! the image (shallowest depth).

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::ProcessError;

/// Crop an image to `target` (height, width) starting at `offset`
/// (top-left corner).
pub fn crop(
    image: &Array2<f64>,
    offset: [usize; 2],
    target: [usize; 2],
) -> Result<Array2<f64>, ProcessError> {
    let (height, width) = image.dim();
    if offset[0] + target[0] > height || offset[1] + target[1] > width {
        return Err(ProcessError::CropOutOfBounds {
            offset,
            target,
            input: [height, width],
        });
    }
    Ok(image
        .slice(s![
            offset[0]..offset[0] + target[0],
            offset[1]..offset[1] + target[1]
        ])
        .to_owned())
}

/// Crop to `target` (height, width), keeping the top edge and centring
/// horizontally.
pub fn top_center_crop(
    image: &Array2<f64>,
    target: [usize; 2],
) -> Result<Array2<f64>, ProcessError> {
    let (height, width) = image.dim();
    if target[0] > height || target[1] > width {
        return Err(ProcessError::CropOutOfBounds {
            offset: [0, 0],
            target,
            input: [height, width],
        });
    }
    let width_start = (width - target[1]) / 2;
    crop(image, [0, width_start], target)
}

/// Top-centre crop to the largest powers of two not exceeding the image
/// height and width.
pub fn top_center_crop_power_two(image: &Array2<f64>) -> Result<Array2<f64>, ProcessError> {
    let (height, width) = image.dim();
    top_center_crop(image, [previous_power_of_two(height), previous_power_of_two(width)])
}

fn previous_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

/// Layer-stripping settings for [`preprocess_image`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSettings {
    /// Height of the air coupling layer to strip from the top (mm).
    pub air_layer_height_mm: Option<f64>,
    /// Height of the gel-pad layer to strip from the top (mm).
    pub gelpad_layer_height_mm: Option<f64>,
    /// Shrink the result to power-of-two dimensions.
    pub crop_power_of_two: bool,
}

/// Strip configured coupling layers from the top of the image and
/// optionally shrink to power-of-two dimensions.
pub fn preprocess_image(
    image: &Array2<f64>,
    settings: &CropSettings,
    spacing_mm: f64,
) -> Result<Array2<f64>, ProcessError> {
    let mut result = image.clone();

    for layer_mm in [settings.air_layer_height_mm, settings.gelpad_layer_height_mm]
        .into_iter()
        .flatten()
    {
        let rows = (layer_mm / spacing_mm) as usize;
        let (height, width) = result.dim();
        if rows >= height {
            return Err(ProcessError::CropOutOfBounds {
                offset: [rows, 0],
                target: [height, width],
                input: [height, width],
            });
        }
        result = result.slice(s![rows.., ..]).to_owned();
    }

    if settings.crop_power_of_two {
        log::debug!("Previous sizes: {:?}", result.dim());
        result = top_center_crop_power_two(&result)?;
        log::debug!("New sizes: {:?}", result.dim());
    }

    Ok(result)
}
