//! Assembly of the final extraction outcome.

use crate::{
    calibration::{CalibrationContext, ScaleMode},
    constants::NUM_POSE_LANDMARKS,
    image_loader::ImageSize,
    measurement::{derive, round_measurement, Gender, MeasurementSet, RatioTable, ScaledPose},
    pose_detection::PoseDetectionResult,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// Which of the two photographs something refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Front,
    Side,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Front => "front",
            Self::Side => "side",
        })
    }
}

/// Expected, user-actionable reasons a photo pair cannot be measured
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionFailure {
    /// The pose model found no body in the image
    PoseNotFound(ImageRole),
    /// The detected body is too small to calibrate against
    BodyTooSmall { role: ImageRole, body_height_pixels: f64 },
}

impl fmt::Display for DetectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoseNotFound(role) => write!(
                f,
                "Could not detect body pose in {role} image. Ensure full body is visible."
            ),
            Self::BodyTooSmall { role: ImageRole::Front, .. } => {
                f.write_str("Body detection error. Retake photos with full body visible.")
            }
            Self::BodyTooSmall { role, .. } => write!(
                f,
                "Body detection error in {role} image. Retake photos with full body visible."
            ),
        }
    }
}

/// Inputs echoed back alongside the measurements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMetadata {
    pub height_cm: f64,
    pub gender: Gender,
    pub body_height_pixels: f64,
    pub front_image_size: ImageSize,
    pub side_image_size: ImageSize,
}

/// Detection summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionConfidence {
    pub front_detection: bool,
    pub side_detection: bool,
    pub landmarks_detected: usize,
}

/// Terminal outcome of one extraction
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Success {
        measurements: MeasurementSet,
        metadata: ExtractionMetadata,
        confidence: DetectionConfidence,
    },
    Failure {
        error: String,
    },
}

impl ExtractionResult {
    pub fn failure<E: fmt::Display>(error: E) -> Self {
        Self::Failure {
            error: error.to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn measurements(&self) -> Option<&MeasurementSet> {
        match self {
            Self::Success { measurements, .. } => Some(measurements),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Pretty-printed JSON document for this outcome
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<DetectionFailure> for ExtractionResult {
    fn from(failure: DetectionFailure) -> Self {
        Self::failure(failure)
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success {
                measurements,
                metadata,
                confidence,
            } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("measurements", measurements)?;
                map.serialize_entry("metadata", metadata)?;
                map.serialize_entry("confidence", confidence)?;
                map.end()
            }
            Self::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Per-call parameters for [`assemble`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyOptions<'a> {
    pub height_cm: f64,
    pub gender: Gender,
    pub scale_mode: ScaleMode,
    pub min_body_height_pixels: f64,
    pub ratios: &'a RatioTable,
}

/// Calibrate, derive and package the measurements for a detected photo pair
///
/// Short-circuits with a failure naming the image if either pose is missing
/// or a scale reference is too small. No partial measurement set is ever
/// returned.
#[must_use]
pub fn assemble(front: &PoseDetectionResult, side: &PoseDetectionResult, options: &AssemblyOptions<'_>) -> ExtractionResult {
    let (front_pose, front_size) = match front {
        PoseDetectionResult::Detected { landmarks, image_size } => (landmarks, *image_size),
        PoseDetectionResult::NotDetected => return DetectionFailure::PoseNotFound(ImageRole::Front).into(),
    };
    let (side_pose, side_size) = match side {
        PoseDetectionResult::Detected { landmarks, image_size } => (landmarks, *image_size),
        PoseDetectionResult::NotDetected => return DetectionFailure::PoseNotFound(ImageRole::Side).into(),
    };

    let front_scale = CalibrationContext::from_pose(front_pose, front_size, options.height_cm);
    if !front_scale.is_reliable(options.min_body_height_pixels) {
        return DetectionFailure::BodyTooSmall {
            role: ImageRole::Front,
            body_height_pixels: front_scale.body_height_pixels,
        }
        .into();
    }

    let side_scale = match options.scale_mode {
        ScaleMode::SharedFront => front_scale,
        ScaleMode::PerImage => {
            let scale = CalibrationContext::from_pose(side_pose, side_size, options.height_cm);
            if !scale.is_reliable(options.min_body_height_pixels) {
                return DetectionFailure::BodyTooSmall {
                    role: ImageRole::Side,
                    body_height_pixels: scale.body_height_pixels,
                }
                .into();
            }
            scale
        }
    };
    log::debug!(
        "Calibration: front {:.1}px, side {:.1}px for {:.1}cm ({:.3} px/cm)",
        front_scale.body_height_pixels,
        side_scale.body_height_pixels,
        options.height_cm,
        front_scale.pixels_per_cm().unwrap_or_default()
    );

    let measurements = derive(
        &ScaledPose::new(front_pose, front_size, front_scale),
        &ScaledPose::new(side_pose, side_size, side_scale),
        options.gender,
        options.ratios,
    );

    ExtractionResult::Success {
        measurements,
        metadata: ExtractionMetadata {
            height_cm: options.height_cm,
            gender: options.gender,
            body_height_pixels: round_measurement(front_scale.body_height_pixels),
            front_image_size: front_size,
            side_image_size: side_size,
        },
        confidence: DetectionConfidence {
            front_detection: true,
            side_detection: true,
            landmarks_detected: NUM_POSE_LANDMARKS,
        },
    }
}
