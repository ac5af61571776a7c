//! Full-body landmark detection.
//!
//! [`LandmarkProvider`] is the seam to the pose model: it returns zero or more
//! 33-point poses for a decoded image. [`detect`] adapts that into a
//! [`PoseDetectionResult`], taking the first pose in provider order.
//! [`PoseLandmarker`] is the ONNX Runtime implementation.

use crate::{
    constants::{
        BLAZEPOSE_OUTPUT_LANDMARKS, BLAZEPOSE_VALUES_PER_LANDMARK, DEFAULT_LANDMARK_INPUT_SIZE,
        DEFAULT_MIN_POSE_PRESENCE, NUM_POSE_LANDMARKS,
    },
    image_loader::{ImageSize, LoadedImage},
    landmarks::{Landmark, PoseLandmarks},
    utils::{image_conversion::bgr_to_rgb_tensor, safe_cast::u32_to_i32, Letterbox},
    Error, Result,
};
use ndarray::{Array4, CowArray};
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Outcome of running pose detection on one image
#[derive(Debug, Clone, PartialEq)]
pub enum PoseDetectionResult {
    /// A body was found
    Detected {
        landmarks: PoseLandmarks,
        image_size: ImageSize,
    },
    /// No body was found in the image
    NotDetected,
}

impl PoseDetectionResult {
    #[must_use]
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }
}

/// Source of full-body landmarks
pub trait LandmarkProvider {
    /// Detect every pose in `image`, in the provider's own order
    ///
    /// # Errors
    ///
    /// Returns an error if inference itself fails. Finding no body is not an error.
    fn detect_poses(&mut self, image: &LoadedImage) -> Result<Vec<PoseLandmarks>>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn detect_poses(&mut self, image: &LoadedImage) -> Result<Vec<PoseLandmarks>> {
        (**self).detect_poses(image)
    }
}

/// Run `provider` once on `image` and keep the first pose
///
/// # Errors
///
/// Propagates provider failures
pub fn detect<P: LandmarkProvider + ?Sized>(provider: &mut P, image: &LoadedImage) -> Result<PoseDetectionResult> {
    let poses = provider.detect_poses(image)?;
    if poses.len() > 1 {
        log::debug!("{} poses detected, using the first", poses.len());
    }

    Ok(poses
        .into_iter()
        .next()
        .map_or(PoseDetectionResult::NotDetected, |landmarks| PoseDetectionResult::Detected {
            landmarks,
            image_size: image.size,
        }))
}

/// Tuning for [`PoseLandmarker`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionSettings {
    /// Square input size used when the model does not declare one
    pub input_size: i32,
    /// Minimum pose presence probability
    pub min_pose_presence: f32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_LANDMARK_INPUT_SIZE,
            min_pose_presence: DEFAULT_MIN_POSE_PRESENCE,
        }
    }
}

/// Memory layout expected by the model input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TensorLayout {
    Nhwc,
    Nchw,
}

/// BlazePose-style landmark network running on `ONNX` Runtime
///
/// The session is released when the landmarker is dropped.
pub struct PoseLandmarker {
    session: Session,
    input_size: i32,
    layout: TensorLayout,
    min_pose_presence: f32,
}

impl PoseLandmarker {
    /// Load the landmark model
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs or outputs
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(model_path: P, settings: DetectionSettings) -> Result<Self> {
        log::info!(
            "Initializing PoseLandmarker with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("pose_landmarker")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelInputError("Model has no inputs".to_string()))?;
        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Model has no outputs".to_string()));
        }

        // [batch, H, W, 3] for the TFLite-derived exports, [batch, 3, H, W] otherwise
        let dims = &input_meta.dimensions;
        let (layout, declared_size) = match dims.as_slice() {
            [_, Some(3), Some(h), _] => (TensorLayout::Nchw, Some(*h)),
            [_, Some(h), _, Some(3)] => (TensorLayout::Nhwc, Some(*h)),
            [_, _, _, Some(3)] => (TensorLayout::Nhwc, None),
            [_, Some(3), _, _] => (TensorLayout::Nchw, None),
            _ => {
                log::warn!("Unrecognised input shape {:?}, assuming NHWC", dims);
                (TensorLayout::Nhwc, None)
            }
        };
        let input_size = match declared_size {
            Some(size) => u32_to_i32(size)?,
            None => settings.input_size,
        };
        log::debug!("Pose model input: {}x{} {:?}", input_size, input_size, layout);

        Ok(Self {
            session,
            input_size,
            layout,
            min_pose_presence: settings.min_pose_presence,
        })
    }

    /// Release the model now rather than at end of scope
    pub fn close(self) {
        drop(self);
    }

    fn preprocess(&self, image: &LoadedImage) -> Result<(Array4<f32>, Letterbox)> {
        let letterbox = Letterbox::new(image.size, self.input_size)?;
        let canvas = letterbox.apply(&image.mat)?;
        let tensor = bgr_to_rgb_tensor(&canvas)?;

        let tensor = match self.layout {
            TensorLayout::Nhwc => tensor,
            TensorLayout::Nchw => tensor.permuted_axes([0, 3, 1, 2]).as_standard_layout().to_owned(),
        };
        Ok((tensor, letterbox))
    }

    /// Run the network and return every output flattened
    fn forward(&self, inputs: Array4<f32>) -> Result<Vec<Vec<f32>>> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mut flattened = Vec::with_capacity(outputs.len());
        for output in &outputs {
            let tensor = output.try_extract::<f32>()?;
            flattened.push(tensor.view().iter().copied().collect());
        }
        Ok(flattened)
    }
}

impl LandmarkProvider for PoseLandmarker {
    fn detect_poses(&mut self, image: &LoadedImage) -> Result<Vec<PoseLandmarks>> {
        let (inputs, letterbox) = self.preprocess(image)?;
        let outputs = self.forward(inputs)?;
        decode_pose(&outputs, &letterbox, self.min_pose_presence)
    }
}

impl Drop for PoseLandmarker {
    fn drop(&mut self) {
        log::debug!("Releasing pose landmark model");
    }
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

/// Values per landmark in a flattened landmark tensor, if it looks like one
fn landmark_stride(len: usize) -> Option<usize> {
    let stride = if len % BLAZEPOSE_OUTPUT_LANDMARKS == 0 {
        len / BLAZEPOSE_OUTPUT_LANDMARKS
    } else if len % NUM_POSE_LANDMARKS == 0 {
        len / NUM_POSE_LANDMARKS
    } else {
        return None;
    };
    (2..=BLAZEPOSE_VALUES_PER_LANDMARK).contains(&stride).then_some(stride)
}

/// Turn raw network outputs into zero or one pose
fn decode_pose(outputs: &[Vec<f32>], letterbox: &Letterbox, min_pose_presence: f32) -> Result<Vec<PoseLandmarks>> {
    // Some exports already apply the sigmoid to the presence flag
    let presence = outputs.iter().find(|o| o.len() == 1).map(|o| {
        let raw = o[0];
        if (0.0..=1.0).contains(&raw) {
            raw
        } else {
            sigmoid(raw)
        }
    });

    match presence {
        Some(score) if score < min_pose_presence => {
            log::debug!("Pose presence {:.3} below threshold {:.3}", score, min_pose_presence);
            return Ok(Vec::new());
        }
        Some(score) => log::debug!("Pose presence {:.3}", score),
        None => log::debug!("Model reports no presence score, accepting landmarks"),
    }

    let (raw, stride) = outputs
        .iter()
        .find_map(|o| landmark_stride(o.len()).map(|stride| (o, stride)))
        .ok_or_else(|| Error::ModelOutputError("No landmark tensor in model outputs".to_string()))?;

    let points: Vec<Landmark> = raw
        .chunks_exact(stride)
        .take(NUM_POSE_LANDMARKS)
        .map(|values| {
            let (x, y) = letterbox.to_normalized(values[0], values[1]);
            let point = Landmark::new(x, y);
            // BlazePose layout: x, y, z, visibility logit, presence logit
            if stride >= 4 {
                point.with_visibility(sigmoid(values[3]))
            } else {
                point
            }
        })
        .collect();

    let pose = PoseLandmarks::from_slice(&points)?;
    if let Some(visibility) = pose.mean_visibility() {
        log::debug!("Mean landmark visibility {:.3}", visibility);
    }
    Ok(vec![pose])
}
