//! Conversion of decoded OpenCV images into model input tensors.

use crate::{constants::PIXEL_NORMALIZATION_SCALE, Error, Result};
use ndarray::{Array3, Array4, Axis};
use opencv::core::{Mat, CV_32F};
use opencv::imgproc;
use opencv::prelude::*;

/// Convert a 3-channel `CV_32F` Mat to an ndarray with shape (height, width, channels)
///
/// # Errors
///
/// Returns an error if the Mat is empty, is not 3-channel, or pixel access fails
#[allow(clippy::cast_sign_loss)] // Dimensions are validated positive first
pub fn mat_to_array3_f32(mat: &Mat) -> Result<Array3<f32>> {
    let rows = mat.rows();
    let cols = mat.cols();
    let channels = mat.channels();

    if rows <= 0 || cols <= 0 || channels != 3 {
        return Err(Error::InvalidInput(format!(
            "Expected a non-empty 3-channel image, got {rows}x{cols}x{channels}"
        )));
    }

    let (height, width) = (rows as usize, cols as usize);
    let mut data = Vec::with_capacity(height * width * 3);

    for row in 0..rows {
        for col in 0..cols {
            let pixel = mat.at_2d::<opencv::core::Vec3f>(row, col)?;
            data.extend_from_slice(&[pixel[0], pixel[1], pixel[2]]);
        }
    }

    Array3::from_shape_vec((height, width, 3), data)
        .map_err(|e| Error::ModelDataFormatError(format!("Failed to create array from Mat: {e}")))
}

/// Turn an 8-bit BGR image into a `[1, H, W, 3]` RGB tensor scaled to [0, 1]
///
/// # Errors
///
/// Returns an error if colour conversion or pixel access fails
pub fn bgr_to_rgb_tensor(image: &Mat) -> Result<Array4<f32>> {
    let mut rgb_image = Mat::default();
    imgproc::cvt_color(image, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

    let mut float_image = Mat::default();
    rgb_image.convert_to(&mut float_image, CV_32F, PIXEL_NORMALIZATION_SCALE, 0.0)?;

    Ok(mat_to_array3_f32(&float_image)?.insert_axis(Axis(0)))
}
