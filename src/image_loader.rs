//! Loading and validation of the input photographs.

use crate::{utils::safe_cast::i32_to_u32, Error, Result};
use opencv::{core::Mat, imgcodecs, prelude::*};
use serde::Serialize;
use std::path::Path;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded BGR image together with its dimensions
#[derive(Debug)]
pub struct LoadedImage {
    pub mat: Mat,
    pub size: ImageSize,
}

impl LoadedImage {
    /// Wrap an already decoded image
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty
    pub fn from_mat(mat: Mat) -> Result<Self> {
        if mat.empty() {
            return Err(Error::InvalidInput("Image has no pixels".to_string()));
        }
        let size = ImageSize::new(i32_to_u32(mat.cols())?, i32_to_u32(mat.rows())?);
        Ok(Self { mat, size })
    }
}

/// Confirm that `path` is an existing, decodable raster image and decode it
///
/// # Errors
///
/// Returns `Error::ImageNotFound` if the path does not exist and
/// `Error::ImageDecode` if the file cannot be decoded
pub fn validate_image<P: AsRef<Path>>(path: P) -> Result<LoadedImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::ImageNotFound(path.to_path_buf()));
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| Error::InvalidInput(format!("Image path is not valid UTF-8: {}", path.display())))?;

    // imread reports undecodable files as an empty matrix
    let mat = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)?;
    if mat.empty() {
        return Err(Error::ImageDecode(path.to_path_buf()));
    }

    let image = LoadedImage::from_mat(mat)?;
    log::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        image.size.width,
        image.size.height
    );
    Ok(image)
}
