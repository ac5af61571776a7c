//! Full-body pose landmarks.
//!
//! The 33-point index table is the BlazePose topology. Any landmark provider
//! plugged into this crate must report joints in exactly this order.

use crate::{constants::NUM_POSE_LANDMARKS, Error, Result};

/// Index of each joint in a 33-point pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// Number of joints in the topology
    pub const COUNT: usize = NUM_POSE_LANDMARKS;

    /// Position of this joint in a landmark sequence
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single detected joint in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// Horizontal position, 0.0 at the left edge and 1.0 at the right edge
    pub x: f32,
    /// Vertical position, 0.0 at the top edge and 1.0 at the bottom edge
    pub y: f32,
    /// Visibility probability if the provider reports one
    pub visibility: Option<f32>,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, visibility: None }
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Position in pixels for an image of the given size
    #[must_use]
    pub fn to_pixel(&self, width: u32, height: u32) -> (f64, f64) {
        (
            f64::from(self.x) * f64::from(width),
            f64::from(self.y) * f64::from(height),
        )
    }
}

/// One detected pose: exactly 33 ordered landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    points: [Landmark; NUM_POSE_LANDMARKS],
}

impl PoseLandmarks {
    #[must_use]
    pub const fn new(points: [Landmark; NUM_POSE_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Build a pose from a provider's landmark list
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not hold exactly 33 landmarks
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; NUM_POSE_LANDMARKS] = points.try_into().map_err(|_| {
            Error::ModelDataFormatError(format!(
                "Expected {NUM_POSE_LANDMARKS} pose landmarks, got {}",
                points.len()
            ))
        })?;
        Ok(Self { points })
    }

    #[must_use]
    pub fn get(&self, joint: PoseLandmark) -> &Landmark {
        &self.points[joint.index()]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Landmark] {
        &self.points
    }

    /// Mean visibility over joints that report one
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_visibility(&self) -> Option<f32> {
        let visible: Vec<f32> = self.points.iter().filter_map(|p| p.visibility).collect();
        if visible.is_empty() {
            None
        } else {
            Some(visible.iter().sum::<f32>() / visible.len() as f32)
        }
    }
}

impl Default for PoseLandmarks {
    fn default() -> Self {
        Self {
            points: [Landmark::default(); NUM_POSE_LANDMARKS],
        }
    }
}
