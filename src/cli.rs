//! Command-line surface of the `body-measurement` binary

use crate::{measurement::Gender, Error, Result};
use clap::Parser;
use std::path::PathBuf;

/// Usage line reported when arguments are missing
pub const USAGE: &str = "Usage: body-measurement <front_image> <side_image> <height_cm> [gender]";

/// Estimate body measurements from a front and a side photograph
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Photo of the person facing the camera
    pub front_image: PathBuf,

    /// Photo of the person in profile
    pub side_image: PathBuf,

    /// Real height of the person in centimetres
    #[arg(allow_hyphen_values = true)]
    pub height_cm: String,

    /// Body type for circumference ratios (male or female)
    #[arg(default_value = "male")]
    pub gender: String,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Override the pose model path
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Parse the height argument
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the value is not a decimal number
    pub fn height(&self) -> Result<f64> {
        self.height_cm
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("Height must be a number of centimetres, got '{}'", self.height_cm)))
    }

    /// Resolve the gender argument, falling back to [`Gender::FALLBACK`]
    #[must_use]
    pub fn gender(&self) -> Gender {
        Gender::from_arg_or_default(&self.gender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_parsing() {
        let args = Args::try_parse_from(["body-measurement", "f.jpg", "s.jpg", "172.5"]).unwrap();
        assert_eq!(args.height().unwrap(), 172.5);

        let args = Args::try_parse_from(["body-measurement", "f.jpg", "s.jpg", "tall"]).unwrap();
        assert!(matches!(args.height(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_gender_defaults_to_male() {
        let args = Args::try_parse_from(["body-measurement", "f.jpg", "s.jpg", "180"]).unwrap();
        assert_eq!(args.gender(), Gender::Male);
    }
}
