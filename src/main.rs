//! Body measurement extraction from a front and a side photograph.
//!
//! Prints exactly one JSON document to stdout. Exit code 0 means the document
//! was produced by the pipeline (including "no body found" failures); exit
//! code 1 means bad arguments or an error outside the pipeline's control.

use anyhow::{Context, Result};
use body_measurement::{
    cli::{Args, USAGE},
    config::Config,
    error::ErrorCategory,
    pipeline::{MeasurementExtractor, MeasurementRequest},
    result::ExtractionResult,
};
use clap::{error::ErrorKind, Parser};
use log::{debug, error, info, warn};
use std::process::ExitCode;

fn emit(result: &ExtractionResult) {
    match result.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => println!("{}", serde_json::json!({ "success": false, "error": e.to_string() })),
    }
}

fn run(args: &Args) -> Result<ExtractionResult> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load config file {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(model) = &args.model {
        config.model.path.clone_from(model);
    }

    let request = MeasurementRequest::new(&args.front_image, &args.side_image, args.height()?, args.gender());
    request.validate()?;

    let mut extractor = MeasurementExtractor::from_config(&config)?;
    let result = extractor.extract(&request)?;
    Ok(result)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            emit(&ExtractionResult::failure(USAGE));
            return ExitCode::FAILURE;
        }
    };

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }
    debug!("Built for {}", env!("BUILD_TARGET"));

    match run(&args) {
        Ok(result) => {
            emit(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let category = e
                .downcast_ref::<body_measurement::Error>()
                .map_or(ErrorCategory::Unexpected, body_measurement::Error::category);
            match category {
                ErrorCategory::Input => warn!("Invalid input: {:#}", e),
                ErrorCategory::Unexpected => error!("Measurement failed: {:#}", e),
            }
            emit(&ExtractionResult::failure(format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}
