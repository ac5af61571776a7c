//! Integration tests for the extraction pipeline with a scripted landmark provider


use body_measurement::{
    config::Config,
    measurement::{Gender, Measurement},
    pipeline::{MeasurementExtractor, MeasurementRequest},
    result::ExtractionResult,
    Result,
};
use test_helpers::*;

fn request_for(dir: &std::path::Path, height_cm: f64, gender: Gender) -> Result<MeasurementRequest> {
    let front = write_test_image(dir, "front.png", 1000, 1000)?;
    let side = write_test_image(dir, "side.png", 1000, 1000)?;
    Ok(MeasurementRequest::new(front, side, height_cm, gender))
}

fn extract(provider: ScriptedProvider, request: &MeasurementRequest) -> Result<ExtractionResult> {
    let mut extractor = MeasurementExtractor::new(provider, &Config::default());
    extractor.extract(request)
}

#[test]
fn test_reference_example() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 180.0, Gender::Male)?;

    let result = extract(ScriptedProvider::both_detected(), &request)?;
    let measurements = result.measurements().expect("extraction should succeed");

    // 840px body for 180cm: 140px shoulders are 30cm
    assert_eq!(measurements.get(Measurement::ShoulderWidth), Some(30.0));
    assert_eq!(measurements.get(Measurement::ChestCircumference), Some(75.0));
    assert_eq!(measurements.get(Measurement::BicepCircumference), Some(13.5));
    assert_eq!(measurements.get(Measurement::WaistCircumference), Some(49.3));
    assert_eq!(measurements.get(Measurement::HipCircumference), Some(62.1));
    assert_eq!(measurements.get(Measurement::NeckCircumference), Some(33.4));
    assert_eq!(measurements.get(Measurement::UpperArmLength), Some(36.4));
    assert_eq!(measurements.get(Measurement::SleeveLength), Some(70.7));
    assert_eq!(measurements.get(Measurement::Inseam), Some(83.6));

    // Right shoulder (0.43, 0.25) to right hip (0.45, 0.55) is ~300.7px
    assert_eq!(measurements.get(Measurement::TorsoLength), Some(64.4));
    // 60px head width is 12.857cm, 100px hip width is 21.429cm
    assert_eq!(measurements.get(Measurement::WristCircumference), Some(10.3));
    assert_eq!(measurements.get(Measurement::ThighCircumference), Some(20.4));

    Ok(())
}

#[test]
fn test_every_measurement_is_present_and_rounded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 172.0, Gender::Female)?;

    let result = extract(ScriptedProvider::both_detected(), &request)?;
    let measurements = result.measurements().expect("extraction should succeed");

    assert_eq!(measurements.len(), Measurement::ALL.len());
    for measurement in Measurement::ALL {
        let value = measurements.get(measurement).expect("missing measurement");
        assert!(value >= 0.0, "{measurement} is negative");
        assert!(has_one_decimal(value), "{measurement} = {value} is not rounded");
    }

    Ok(())
}

#[test]
fn test_success_json_shape() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let front = write_test_image(dir.path(), "front.png", 600, 1000)?;
    let side = write_test_image(dir.path(), "side.png", 700, 1000)?;
    let request = MeasurementRequest::new(front, side, 165.0, Gender::Female);

    let result = extract(ScriptedProvider::both_detected(), &request)?;
    let json = serde_json::to_value(&result)?;

    assert_eq!(json["success"], true);
    assert_eq!(json["measurements"].as_object().map(|m| m.len()), Some(12));
    assert!(json["measurements"]["thigh_circumference"].is_number());
    assert_eq!(json["metadata"]["height_cm"], 165.0);
    assert_eq!(json["metadata"]["gender"], "female");
    assert_eq!(json["metadata"]["body_height_pixels"], 840.0);
    assert_eq!(json["metadata"]["front_image_size"], serde_json::json!({"width": 600, "height": 1000}));
    assert_eq!(json["metadata"]["side_image_size"], serde_json::json!({"width": 700, "height": 1000}));
    assert_eq!(
        json["confidence"],
        serde_json::json!({"front_detection": true, "side_detection": true, "landmarks_detected": 33})
    );

    Ok(())
}

#[test]
fn test_side_pose_missing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 180.0, Gender::Male)?;

    let provider = ScriptedProvider::new(vec![vec![front_pose()], vec![]]);
    let result = extract(provider, &request)?;

    assert!(!result.is_success());
    assert_eq!(
        result.error(),
        Some("Could not detect body pose in side image. Ensure full body is visible.")
    );
    let json = serde_json::to_value(&result)?;
    assert_eq!(json["success"], false);
    assert!(json.get("measurements").is_none());

    Ok(())
}

#[test]
fn test_front_pose_missing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 180.0, Gender::Male)?;

    let provider = ScriptedProvider::new(vec![vec![], vec![side_pose()]]);
    let result = extract(provider, &request)?;

    assert!(result.error().unwrap_or_default().contains("front image"));
    Ok(())
}

#[test]
fn test_small_body_is_a_detection_failure() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 180.0, Gender::Male)?;

    // 0.09 of a 1000px image is 90px, under the 100px guard
    let provider = ScriptedProvider::new(vec![vec![crouched_pose(0.09)], vec![side_pose()]]);
    let result = extract(provider, &request)?;
    assert_eq!(
        result.error(),
        Some("Body detection error. Retake photos with full body visible.")
    );

    // 0.2 of the image is 200px and passes
    let provider = ScriptedProvider::new(vec![vec![crouched_pose(0.2)], vec![side_pose()]]);
    assert!(extract(provider, &request)?.is_success());

    Ok(())
}

#[test]
fn test_gender_only_changes_circumference_ratios() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let male = extract(
        ScriptedProvider::both_detected(),
        &request_for(dir.path(), 180.0, Gender::Male)?,
    )?;
    let female = extract(
        ScriptedProvider::both_detected(),
        &request_for(dir.path(), 180.0, Gender::Female)?,
    )?;
    let (male, female) = (male.measurements().unwrap(), female.measurements().unwrap());

    for measurement in [
        Measurement::ChestCircumference,
        Measurement::WaistCircumference,
        Measurement::HipCircumference,
    ] {
        assert_ne!(male.get(measurement), female.get(measurement), "{measurement}");
    }
    for measurement in [
        Measurement::ShoulderWidth,
        Measurement::SleeveLength,
        Measurement::UpperArmLength,
        Measurement::Inseam,
        Measurement::TorsoLength,
        Measurement::NeckCircumference,
        Measurement::BicepCircumference,
        Measurement::WristCircumference,
        Measurement::ThighCircumference,
    ] {
        assert_eq!(male.get(measurement), female.get(measurement), "{measurement}");
    }

    assert_eq!(female.get(Measurement::ChestCircumference), Some(72.0));
    Ok(())
}

#[test]
fn test_repeated_extraction_is_identical() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 168.5, Gender::Male)?;

    let first = extract(ScriptedProvider::both_detected(), &request)?;
    let second = extract(ScriptedProvider::both_detected(), &request)?;
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&first)?, serde_json::to_string(&second)?);

    Ok(())
}

#[test]
fn test_provider_is_called_once_per_image() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let request = request_for(dir.path(), 180.0, Gender::Male)?;

    let mut extractor = MeasurementExtractor::new(ScriptedProvider::both_detected(), &Config::default());
    extractor.extract(&request)?;
    assert_eq!(extractor.into_provider().map(|p| p.calls), Some(2));

    Ok(())
}
