//! Pixel-to-centimetre calibration and landmark geometry.
//!
//! The only scale reference is the person's stated height. Body height in
//! pixels is the vertical span from the nose to the mean ankle height.

use crate::{
    image_loader::ImageSize,
    landmarks::{Landmark, PoseLandmark, PoseLandmarks},
};
use serde::{Deserialize, Serialize};

/// Which detected height each image is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Calibrate once on the front image and reuse it for the side image
    #[default]
    SharedFront,
    /// Calibrate each image on its own detected height
    PerImage,
}

/// Nose-to-ankle span in pixels
#[must_use]
pub fn body_height_pixels(landmarks: &PoseLandmarks, image_height: u32) -> f64 {
    let nose = landmarks.get(PoseLandmark::Nose);
    let left_ankle = landmarks.get(PoseLandmark::LeftAnkle);
    let right_ankle = landmarks.get(PoseLandmark::RightAnkle);

    let avg_ankle_y = (f64::from(left_ankle.y) + f64::from(right_ankle.y)) / 2.0;
    (f64::from(nose.y) - avg_ankle_y).abs() * f64::from(image_height)
}

/// Convert a pixel length to centimetres
///
/// A zero body height yields 0 rather than a division fault.
#[must_use]
pub fn pixels_to_cm(pixel_value: f64, real_height_cm: f64, body_height_pixels: f64) -> f64 {
    if body_height_pixels == 0.0 {
        return 0.0;
    }
    pixel_value * real_height_cm / body_height_pixels
}

/// Euclidean distance in pixels between two normalized landmarks
#[must_use]
pub fn pixel_distance(a: &Landmark, b: &Landmark, size: ImageSize) -> f64 {
    let (x1, y1) = a.to_pixel(size.width, size.height);
    let (x2, y2) = b.to_pixel(size.width, size.height);
    (x2 - x1).hypot(y2 - y1)
}

/// Scale reference for one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationContext {
    pub body_height_pixels: f64,
    pub real_height_cm: f64,
}

impl CalibrationContext {
    #[must_use]
    pub const fn new(body_height_pixels: f64, real_height_cm: f64) -> Self {
        Self {
            body_height_pixels,
            real_height_cm,
        }
    }

    /// Calibrate from a detected pose
    #[must_use]
    pub fn from_pose(landmarks: &PoseLandmarks, size: ImageSize, real_height_cm: f64) -> Self {
        Self::new(body_height_pixels(landmarks, size.height), real_height_cm)
    }

    /// Pixels per centimetre, `None` when the reference span is degenerate
    #[must_use]
    pub fn pixels_per_cm(&self) -> Option<f64> {
        (self.body_height_pixels != 0.0 && self.real_height_cm != 0.0)
            .then(|| self.body_height_pixels / self.real_height_cm)
    }

    /// Whether the reference span is large enough to trust
    #[must_use]
    pub fn is_reliable(&self, min_body_height_pixels: f64) -> bool {
        self.body_height_pixels >= min_body_height_pixels
    }

    #[must_use]
    pub fn to_cm(&self, pixel_value: f64) -> f64 {
        pixels_to_cm(pixel_value, self.real_height_cm, self.body_height_pixels)
    }

    /// Distance between two joints of `pose`, in centimetres
    #[must_use]
    pub fn distance_cm(&self, pose: &PoseLandmarks, size: ImageSize, from: PoseLandmark, to: PoseLandmark) -> f64 {
        self.to_cm(pixel_distance(pose.get(from), pose.get(to), size))
    }
}
