//! Error handling tests for the extraction pipeline


use body_measurement::{
    config::Config,
    error::{Error, ErrorCategory},
    image_loader::LoadedImage,
    landmarks::PoseLandmarks,
    measurement::Gender,
    model_asset::{LocalModel, ModelSource},
    pipeline::{MeasurementExtractor, MeasurementRequest},
    pose_detection::LandmarkProvider,
    result::ExtractionResult,
    Result,
};
use std::io::Write;
use test_helpers::*;

struct BrokenProvider;

impl LandmarkProvider for BrokenProvider {
    fn detect_poses(&mut self, _image: &LoadedImage) -> Result<Vec<PoseLandmarks>> {
        Err(Error::ModelError("inference crashed".to_string()))
    }
}

#[test]
fn test_missing_front_image() {
    let dir = tempfile::tempdir().unwrap();
    let side = write_test_image(dir.path(), "side.png", 100, 200).unwrap();
    let request = MeasurementRequest::new(dir.path().join("front.png"), side, 180.0, Gender::Male);

    let mut extractor = MeasurementExtractor::new(ScriptedProvider::both_detected(), &Config::default());
    let err = extractor.extract(&request).unwrap_err();

    assert!(matches!(err, Error::ImageNotFound(_)));
    assert_eq!(err.category(), ErrorCategory::Input);
    // Nothing is detected when an input is missing
    assert_eq!(extractor.into_provider().map(|p| p.calls), Some(0));
}

#[test]
fn test_undecodable_side_image() {
    let dir = tempfile::tempdir().unwrap();
    let front = write_test_image(dir.path(), "front.png", 100, 200).unwrap();
    let side = dir.path().join("side.jpg");
    std::fs::File::create(&side).unwrap().write_all(b"not an image").unwrap();

    let request = MeasurementRequest::new(front, side, 180.0, Gender::Male);
    let mut extractor = MeasurementExtractor::new(ScriptedProvider::both_detected(), &Config::default());

    let err = extractor.extract(&request).unwrap_err();
    assert!(matches!(err, Error::ImageDecode(_)));
    assert!(err.to_string().contains("side.jpg"));
}

#[test]
fn test_invalid_height_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let front = write_test_image(dir.path(), "front.png", 100, 200).unwrap();
    let side = write_test_image(dir.path(), "side.png", 100, 200).unwrap();
    let request = MeasurementRequest::new(front, side, -1.0, Gender::Male);

    let mut extractor = MeasurementExtractor::new(ScriptedProvider::both_detected(), &Config::default());
    let err = extractor.extract(&request).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[test]
fn test_implausible_height_is_rejected_before_detection() {
    let dir = tempfile::tempdir().unwrap();
    let front = write_test_image(dir.path(), "front.png", 100, 200).unwrap();
    let side = write_test_image(dir.path(), "side.png", 100, 200).unwrap();

    for height in [0.5, 49.9, 300.1, 9000.0] {
        let request = MeasurementRequest::new(&front, &side, height, Gender::Male);
        let mut extractor = MeasurementExtractor::new(ScriptedProvider::both_detected(), &Config::default());

        let err = extractor.extract(&request).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{height}: {err}");
        assert_eq!(extractor.into_provider().map(|p| p.calls), Some(0));
    }
}

#[test]
fn test_provider_failure_is_unexpected() {
    let dir = tempfile::tempdir().unwrap();
    let front = write_test_image(dir.path(), "front.png", 100, 200).unwrap();
    let side = write_test_image(dir.path(), "side.png", 100, 200).unwrap();
    let request = MeasurementRequest::new(front, side, 180.0, Gender::Male);

    let mut extractor = MeasurementExtractor::new(BrokenProvider, &Config::default());
    let err = extractor.extract(&request).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Unexpected);
    assert!(err.to_string().contains("inference crashed"));
}

#[test]
fn test_missing_model_is_reported() {
    let mut config = Config::default();
    config.model.path = "assets/not_a_model.onnx".into();

    let source = LocalModel::new(&config.model.path);
    assert!(source.resolve().is_err());
    assert!(MeasurementExtractor::from_config(&config).is_err());
}

#[test]
fn test_invalid_config_is_rejected_before_loading() {
    let mut config = Config::default();
    config.detection.min_pose_presence = -0.5;

    match MeasurementExtractor::from_config(&config) {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("presence")),
        Err(other) => panic!("expected ConfigError, got {other}"),
        Ok(_) => panic!("expected ConfigError"),
    }
}

#[test]
fn test_failure_document_for_errors() {
    let err = Error::ImageNotFound("front.jpg".into());
    let json = serde_json::to_value(ExtractionResult::failure(&err)).unwrap();
    assert_eq!(json, serde_json::json!({"success": false, "error": "Image not found: front.jpg"}));
}

#[test]
fn test_error_display_formatting() {
    let errors = vec![
        Error::InvalidInput("Test input error".to_string()),
        Error::ModelError("Test model error".to_string()),
        Error::ModelDownload("Test download error".to_string()),
        Error::ConfigError("Test config error".to_string()),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty());
        assert!(display.contains("Test"));
    }
}
