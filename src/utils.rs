//! Utility functions for image processing and coordinate transformations.

pub mod image_conversion;
pub mod safe_cast;

use crate::{image_loader::ImageSize, Error, Result};
use opencv::core::{self, Mat, Scalar, Size};
use opencv::imgproc::{self, InterpolationFlags};
use safe_cast::f64_to_i32_clamp;

/// Aspect-preserving fit of an image into a square model input
///
/// The scaled image is centred and the remainder padded with black.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    source: ImageSize,
    target: i32,
    scale: f64,
    scaled_width: i32,
    scaled_height: i32,
    pad_x: i32,
    pad_y: i32,
}

impl Letterbox {
    /// Plan the fit of `source` into a `target` x `target` canvas
    ///
    /// # Errors
    ///
    /// Returns an error if either size is zero
    pub fn new(source: ImageSize, target: i32) -> Result<Self> {
        if source.width == 0 || source.height == 0 || target <= 0 {
            return Err(Error::InvalidInput(format!(
                "Cannot letterbox {}x{} into {target}x{target}",
                source.width, source.height
            )));
        }

        let target_f = f64::from(target);
        let scale = (target_f / f64::from(source.width)).min(target_f / f64::from(source.height));
        let scaled_width = f64_to_i32_clamp(f64::from(source.width) * scale, 1, target);
        let scaled_height = f64_to_i32_clamp(f64::from(source.height) * scale, 1, target);

        Ok(Self {
            source,
            target,
            scale,
            scaled_width,
            scaled_height,
            pad_x: (target - scaled_width) / 2,
            pad_y: (target - scaled_height) / 2,
        })
    }

    /// Resize and pad `image` into the model canvas
    ///
    /// # Errors
    ///
    /// Returns an error if an `OpenCV` operation fails
    pub fn apply(&self, image: &Mat) -> Result<Mat> {
        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(self.scaled_width, self.scaled_height),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut canvas = Mat::default();
        core::copy_make_border(
            &resized,
            &mut canvas,
            self.pad_y,
            self.target - self.scaled_height - self.pad_y,
            self.pad_x,
            self.target - self.scaled_width - self.pad_x,
            core::BORDER_CONSTANT,
            Scalar::all(0.0),
        )?;
        Ok(canvas)
    }

    /// Map a point in canvas pixels back to normalized source coordinates
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Normalized coordinates fit f32
    pub fn to_normalized(&self, canvas_x: f32, canvas_y: f32) -> (f32, f32) {
        let x = (f64::from(canvas_x) - f64::from(self.pad_x)) / self.scale / f64::from(self.source.width);
        let y = (f64::from(canvas_y) - f64::from(self.pad_y)) / self.scale / f64::from(self.source.height);
        (x as f32, y as f32)
    }
}
