//! Derivation of body measurements from calibrated landmarks.
//!
//! Lengths come straight from landmark distances. Circumferences cannot be
//! seen in a 2D photo, so they are estimated by multiplying a measured width
//! by an empirical ratio. Intermediates are kept at full precision and only
//! the surfaced values are rounded.

use crate::{
    calibration::CalibrationContext,
    constants::MEASUREMENT_DECIMALS,
    image_loader::ImageSize,
    landmarks::{PoseLandmark, PoseLandmarks},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Body type selecting the circumference ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// Value used when a gender argument is not recognised
    pub const FALLBACK: Self = Self::Female;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse a user-supplied gender, falling back to [`Gender::FALLBACK`]
    #[must_use]
    pub fn from_arg_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::warn!(
                "Unrecognised gender '{}', using {} ratios",
                value,
                Self::FALLBACK
            );
            Self::FALLBACK
        })
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(Error::InvalidInput(format!("Unknown gender: {other}"))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every measurement the deriver reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    ShoulderWidth,
    ChestCircumference,
    WaistCircumference,
    HipCircumference,
    SleeveLength,
    UpperArmLength,
    NeckCircumference,
    Inseam,
    TorsoLength,
    BicepCircumference,
    WristCircumference,
    ThighCircumference,
}

impl Measurement {
    pub const ALL: [Self; 12] = [
        Self::ShoulderWidth,
        Self::ChestCircumference,
        Self::WaistCircumference,
        Self::HipCircumference,
        Self::SleeveLength,
        Self::UpperArmLength,
        Self::NeckCircumference,
        Self::Inseam,
        Self::TorsoLength,
        Self::BicepCircumference,
        Self::WristCircumference,
        Self::ThighCircumference,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ShoulderWidth => "shoulder_width",
            Self::ChestCircumference => "chest_circumference",
            Self::WaistCircumference => "waist_circumference",
            Self::HipCircumference => "hip_circumference",
            Self::SleeveLength => "sleeve_length",
            Self::UpperArmLength => "upper_arm_length",
            Self::NeckCircumference => "neck_circumference",
            Self::Inseam => "inseam",
            Self::TorsoLength => "torso_length",
            Self::BicepCircumference => "bicep_circumference",
            Self::WristCircumference => "wrist_circumference",
            Self::ThighCircumference => "thigh_circumference",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Circumference multipliers for one body type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircumferenceRatios {
    /// Chest circumference per unit of shoulder width
    pub chest: f64,
    /// Waist circumference per unit of hip width
    pub waist: f64,
    /// Hip circumference per unit of hip width
    pub hip: f64,
}

/// Empirical ratios used for measurements that landmarks cannot express
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioTable {
    pub male: CircumferenceRatios,
    pub female: CircumferenceRatios,
    /// Neck circumference per unit of ear-to-ear width
    pub neck_from_head: f64,
    /// Bicep circumference per unit of shoulder width
    pub bicep_from_shoulder: f64,
    /// Wrist circumference per unit of ear-to-ear width
    pub wrist_from_head: f64,
    /// Thigh circumference per unit of hip width
    pub thigh_from_hip: f64,
}

impl Default for RatioTable {
    fn default() -> Self {
        Self {
            male: CircumferenceRatios {
                chest: 2.5,
                waist: 2.3,
                hip: 2.9,
            },
            female: CircumferenceRatios {
                chest: 2.4,
                waist: 2.2,
                hip: 3.0,
            },
            neck_from_head: 2.6,
            bicep_from_shoulder: 0.45,
            wrist_from_head: 0.8,
            thigh_from_hip: 0.95,
        }
    }
}

impl RatioTable {
    #[must_use]
    pub const fn circumference(&self, gender: Gender) -> &CircumferenceRatios {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    /// Check every ratio is a positive finite number
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first bad ratio
    pub fn validate(&self) -> Result<()> {
        let entries = [
            ("male.chest", self.male.chest),
            ("male.waist", self.male.waist),
            ("male.hip", self.male.hip),
            ("female.chest", self.female.chest),
            ("female.waist", self.female.waist),
            ("female.hip", self.female.hip),
            ("neck_from_head", self.neck_from_head),
            ("bicep_from_shoulder", self.bicep_from_shoulder),
            ("wrist_from_head", self.wrist_from_head),
            ("thigh_from_hip", self.thigh_from_hip),
        ];
        for (name, value) in entries {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigError(format!(
                    "Ratio {name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Round to the surfaced precision
///
/// Rounds the exact stored value, so 30.15 (held as 30.1499...) becomes 30.1
/// and exact ties go to the even digit.
#[must_use]
pub fn round_measurement(value: f64) -> f64 {
    format!("{value:.MEASUREMENT_DECIMALS$}").parse().unwrap_or(value)
}

/// Rounded centimetre values keyed by measurement
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct MeasurementSet {
    values: BTreeMap<Measurement, f64>,
}

impl MeasurementSet {
    fn insert(&mut self, measurement: Measurement, value_cm: f64) {
        self.values.insert(measurement, round_measurement(value_cm));
    }

    #[must_use]
    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        self.values.get(&measurement).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f64)> + '_ {
        self.values.iter().map(|(&m, &v)| (m, v))
    }
}

/// A detected pose with the image size and scale it is measured in
#[derive(Debug, Clone, Copy)]
pub struct ScaledPose<'a> {
    pub landmarks: &'a PoseLandmarks,
    pub size: ImageSize,
    pub scale: CalibrationContext,
}

impl<'a> ScaledPose<'a> {
    #[must_use]
    pub const fn new(landmarks: &'a PoseLandmarks, size: ImageSize, scale: CalibrationContext) -> Self {
        Self { landmarks, size, scale }
    }

    fn distance_cm(&self, from: PoseLandmark, to: PoseLandmark) -> f64 {
        self.scale.distance_cm(self.landmarks, self.size, from, to)
    }
}

/// Derive every measurement from the front and side poses
///
/// Widths come from the front photo, arm and leg lengths from the right side
/// of the body in the side photo.
#[must_use]
pub fn derive(front: &ScaledPose<'_>, side: &ScaledPose<'_>, gender: Gender, ratios: &RatioTable) -> MeasurementSet {
    use PoseLandmark::{
        LeftEar, LeftHip, LeftShoulder, RightAnkle, RightEar, RightElbow, RightHip, RightShoulder, RightWrist,
    };

    let circumference = ratios.circumference(gender);
    let mut set = MeasurementSet::default();

    // Front widths, unrounded; circumferences are derived from these
    let shoulder_width_cm = front.distance_cm(LeftShoulder, RightShoulder);
    let hip_width_cm = front.distance_cm(LeftHip, RightHip);
    let head_width_cm = front.distance_cm(LeftEar, RightEar);

    set.insert(Measurement::ShoulderWidth, shoulder_width_cm);
    set.insert(Measurement::ChestCircumference, shoulder_width_cm * circumference.chest);
    set.insert(Measurement::WaistCircumference, hip_width_cm * circumference.waist);
    set.insert(Measurement::HipCircumference, hip_width_cm * circumference.hip);

    set.insert(Measurement::SleeveLength, side.distance_cm(RightShoulder, RightWrist));
    set.insert(Measurement::UpperArmLength, side.distance_cm(RightShoulder, RightElbow));
    set.insert(Measurement::NeckCircumference, head_width_cm * ratios.neck_from_head);
    set.insert(Measurement::Inseam, side.distance_cm(RightHip, RightAnkle));
    set.insert(Measurement::TorsoLength, front.distance_cm(RightShoulder, RightHip));

    set.insert(Measurement::BicepCircumference, shoulder_width_cm * ratios.bicep_from_shoulder);
    set.insert(Measurement::WristCircumference, head_width_cm * ratios.wrist_from_head);
    set.insert(Measurement::ThighCircumference, hip_width_cm * ratios.thigh_from_hip);

    set
}
