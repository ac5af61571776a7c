//! Constants used throughout the library

/// Number of landmarks in one full-body pose
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Values per landmark in the BlazePose landmark tensor (x, y, z, visibility, presence)
pub const BLAZEPOSE_VALUES_PER_LANDMARK: usize = 5;

/// Landmarks emitted by the BlazePose network, including the auxiliary ROI points
pub const BLAZEPOSE_OUTPUT_LANDMARKS: usize = 39;

/// Default square input size of the landmark network
pub const DEFAULT_LANDMARK_INPUT_SIZE: i32 = 256;

/// Minimum pose presence score for a detection to count
pub const DEFAULT_MIN_POSE_PRESENCE: f32 = 0.5;

/// Minimum nose-to-ankle span, in pixels, accepted as a scale reference
pub const MIN_BODY_HEIGHT_PIXELS: f64 = 100.0;

/// Smallest accepted real height, in centimetres
pub const MIN_HEIGHT_CM: f64 = 50.0;

/// Largest accepted real height, in centimetres
pub const MAX_HEIGHT_CM: f64 = 300.0;

/// Default wall-clock limit for detecting both photos, in seconds
pub const DEFAULT_DETECTION_TIMEOUT_SECS: f64 = 30.0;

/// Default location of the pose landmark model
pub const DEFAULT_MODEL_PATH: &str = "assets/pose_landmark.onnx";

/// Pixel normalization scale for the landmark network
pub const PIXEL_NORMALIZATION_SCALE: f64 = 1.0 / 255.0;

/// Decimal places kept on surfaced measurements
pub const MEASUREMENT_DECIMALS: usize = 1;
