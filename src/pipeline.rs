//! End-to-end measurement extraction for one front/side photo pair.
//!
//! Control flow is linear: load both images, detect a pose in each, then
//! calibrate, derive and assemble. Bad inputs surface as [`Error`]s; a photo
//! without a usable body surfaces as a failed [`ExtractionResult`].
//! Detection runs on a worker thread when a deadline is configured.

use crate::{
    calibration::ScaleMode,
    config::Config,
    constants::{MAX_HEIGHT_CM, MIN_HEIGHT_CM},
    image_loader::{validate_image, LoadedImage},
    measurement::{Gender, RatioTable},
    model_asset::{check_model_file, ModelSource},
    pose_detection::{detect, LandmarkProvider, PoseDetectionResult, PoseLandmarker},
    result::{assemble, AssemblyOptions, ExtractionResult},
    Error, Result,
};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// One measurement request
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRequest {
    pub front_image: PathBuf,
    pub side_image: PathBuf,
    pub height_cm: f64,
    pub gender: Gender,
}

impl MeasurementRequest {
    pub fn new<F: Into<PathBuf>, S: Into<PathBuf>>(front_image: F, side_image: S, height_cm: f64, gender: Gender) -> Self {
        Self {
            front_image: front_image.into(),
            side_image: side_image.into(),
            height_cm,
            gender,
        }
    }

    /// Check the height is a plausible human height and both photos exist
    ///
    /// Runs before any model is loaded, so bad input is reported first.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for heights outside
    /// [`MIN_HEIGHT_CM`]..=[`MAX_HEIGHT_CM`] (including non-finite values), or
    /// `Error::ImageNotFound` for a missing photo
    pub fn validate(&self) -> Result<()> {
        if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&self.height_cm) {
            return Err(Error::InvalidInput(format!(
                "Height must be between {MIN_HEIGHT_CM} and {MAX_HEIGHT_CM} cm, got {}",
                self.height_cm
            )));
        }
        for path in [&self.front_image, &self.side_image] {
            if !path.exists() {
                return Err(Error::ImageNotFound(path.clone()));
            }
        }
        Ok(())
    }
}

/// Measurement pipeline owning its landmark provider
///
/// Dropping the extractor releases the provider. A provider that overruns the
/// detection deadline is abandoned on its worker thread, and later calls fail.
pub struct MeasurementExtractor<P: LandmarkProvider> {
    provider: Option<P>,
    detection_timeout: Option<Duration>,
    ratios: RatioTable,
    scale_mode: ScaleMode,
    min_body_height_pixels: f64,
}

impl MeasurementExtractor<PoseLandmarker> {
    /// Resolve the configured model and load it
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the model cannot be
    /// obtained or loaded
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let source = config.model.source();
        Self::with_model_source(source.as_ref(), config)
    }

    /// Load the model from an explicit source
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be obtained or loaded
    pub fn with_model_source(source: &dyn ModelSource, config: &Config) -> Result<Self> {
        let model_path = source.resolve()?;
        check_model_file(&model_path)?;
        let landmarker = PoseLandmarker::new(&model_path, config.detection.settings())?;
        Ok(Self::new(landmarker, config))
    }
}

impl<P: LandmarkProvider + Send + 'static> MeasurementExtractor<P> {
    /// Wrap an existing provider
    pub fn new(provider: P, config: &Config) -> Self {
        Self {
            provider: Some(provider),
            detection_timeout: config.detection.timeout(),
            ratios: config.ratios,
            scale_mode: config.calibration.scale_mode,
            min_body_height_pixels: config.calibration.min_body_height_pixels,
        }
    }

    /// Measure one photo pair
    ///
    /// # Errors
    ///
    /// Returns an error if the height is invalid, an image is missing or
    /// undecodable, the provider fails, or detection overruns its deadline.
    /// Undetected bodies are reported in the returned [`ExtractionResult`]
    /// instead.
    pub fn extract(&mut self, request: &MeasurementRequest) -> Result<ExtractionResult> {
        request.validate()?;

        let front_image = validate_image(&request.front_image)?;
        let side_image = validate_image(&request.side_image)?;
        let (front_size, side_size) = (front_image.size, side_image.size);

        let (front, side) = self.detect_pair(front_image, side_image)?;
        log::info!(
            "Front image {}x{}: pose {}",
            front_size.width,
            front_size.height,
            if front.is_detected() { "detected" } else { "not detected" }
        );
        log::info!(
            "Side image {}x{}: pose {}",
            side_size.width,
            side_size.height,
            if side.is_detected() { "detected" } else { "not detected" }
        );

        let result = assemble(
            &front,
            &side,
            &AssemblyOptions {
                height_cm: request.height_cm,
                gender: request.gender,
                scale_mode: self.scale_mode,
                min_body_height_pixels: self.min_body_height_pixels,
                ratios: &self.ratios,
            },
        );
        if let Some(error) = result.error() {
            log::warn!("Extraction failed: {}", error);
        }
        Ok(result)
    }

    /// Detect the front then the side pose, within the deadline if one is set
    fn detect_pair(&mut self, front: LoadedImage, side: LoadedImage) -> Result<(PoseDetectionResult, PoseDetectionResult)> {
        let mut provider = self
            .provider
            .take()
            .ok_or_else(|| Error::ModelError("Pose detector was abandoned after an earlier timeout".to_string()))?;

        let Some(timeout) = self.detection_timeout else {
            let detected = detect_both(&mut provider, &front, &side);
            self.provider = Some(provider);
            return detected;
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("pose-detection".to_string())
            .spawn(move || {
                let detected = detect_both(&mut provider, &front, &side);
                let _ = tx.send((provider, detected));
            })?;

        match rx.recv_timeout(timeout) {
            Ok((provider, detected)) => {
                self.provider = Some(provider);
                detected
            }
            Err(RecvTimeoutError::Timeout) => {
                log::error!("Pose detection exceeded {:.1}s", timeout.as_secs_f64());
                Err(Error::ModelError(format!(
                    "Pose detection timed out after {:.1}s",
                    timeout.as_secs_f64()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::ModelError("Pose detection worker stopped unexpectedly".to_string()))
            }
        }
    }

    /// Hand back the provider, ending the extractor
    ///
    /// Returns `None` if the provider was abandoned after a timeout.
    pub fn into_provider(self) -> Option<P> {
        self.provider
    }
}

fn detect_both<P: LandmarkProvider>(
    provider: &mut P,
    front: &LoadedImage,
    side: &LoadedImage,
) -> Result<(PoseDetectionResult, PoseDetectionResult)> {
    let front = detect(provider, front)?;
    let side = detect(provider, side)?;
    Ok((front, side))
}
