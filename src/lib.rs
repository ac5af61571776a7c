//! Body measurement estimation from two photographs and a known height.
//!
//! This library estimates tailoring measurements using:
//! - ONNX Runtime for full-body pose landmark inference
//! - `OpenCV` for image decoding and preprocessing
//! - A fixed table of anthropometric ratios for circumferences
//!
//! The extraction pipeline consists of:
//! 1. Loading and validating the front and side photographs
//! 2. Detecting 33 body landmarks in each photo
//! 3. Calibrating a pixel-per-centimetre scale from the person's height
//! 4. Deriving lengths from landmark distances and circumferences from ratios
//!
//! # Examples
//!
//! ## Command-line style usage
//!
//! ```no_run
//! use body_measurement::{
//!     config::Config,
//!     measurement::Gender,
//!     pipeline::{MeasurementExtractor, MeasurementRequest},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut extractor = MeasurementExtractor::from_config(&Config::default())?;
//! let request = MeasurementRequest::new("front.jpg", "side.jpg", 178.0, Gender::Male);
//!
//! let result = extractor.extract(&request)?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Deriving from known landmarks
//!
//! ```
//! use body_measurement::{
//!     calibration::CalibrationContext,
//!     image_loader::ImageSize,
//!     landmarks::{Landmark, PoseLandmark, PoseLandmarks},
//!     measurement::{derive, Gender, Measurement, RatioTable, ScaledPose},
//! };
//!
//! let mut points = [Landmark::new(0.5, 0.5); 33];
//! points[PoseLandmark::LeftShoulder.index()] = Landmark::new(0.43, 0.25);
//! points[PoseLandmark::RightShoulder.index()] = Landmark::new(0.57, 0.25);
//! let pose = PoseLandmarks::new(points);
//!
//! let scale = CalibrationContext::new(840.0, 180.0);
//! let front = ScaledPose::new(&pose, ImageSize::new(1000, 1000), scale);
//! let set = derive(&front, &front, Gender::Male, &RatioTable::default());
//!
//! assert_eq!(set.get(Measurement::ShoulderWidth), Some(30.0));
//! assert_eq!(set.get(Measurement::ChestCircumference), Some(75.0));
//! ```

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// The 33-point body landmark topology
pub mod landmarks;

/// Loading and validation of input photographs
pub mod image_loader;

/// Pose landmark providers and the ONNX landmarker
pub mod pose_detection;

/// Resolution and download of the pose model
pub mod model_asset;

/// Pixel-to-centimetre calibration
pub mod calibration;

/// Measurement vocabulary, ratio table and derivation
pub mod measurement;

/// Extraction outcome and its assembly
pub mod result;

/// End-to-end extraction pipeline
pub mod pipeline;

/// Configuration management
pub mod config;

/// Command-line arguments
pub mod cli;

/// Utility functions for image processing and coordinate transformations
pub mod utils;

pub use error::{Error, Result};
