//! Resolution of the pose model file.
//!
//! The pipeline only ever asks a [`ModelSource`] for a local path, so tests and
//! offline deployments can hand it a file directly while the CLI may fetch the
//! model on first use.

use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Something that can produce a local path to the pose model
pub trait ModelSource {
    /// Return the path of a readable model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model is unavailable
    fn resolve(&self) -> Result<PathBuf>;
}

/// A model that must already be on disk
#[derive(Debug, Clone)]
pub struct LocalModel {
    path: PathBuf,
}

impl LocalModel {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl ModelSource for LocalModel {
    fn resolve(&self) -> Result<PathBuf> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(Error::ModelError(format!(
                "Pose model not found: {}. Place the ONNX file there, pass --model <path>, \
                 or set model.url in the config to download it on first use",
                self.path.display()
            )))
        }
    }
}

/// A model cached at `path`, downloaded from `url` the first time it is needed
#[derive(Debug, Clone)]
pub struct CachedDownload {
    path: PathBuf,
    url: String,
}

impl CachedDownload {
    pub fn new<P: Into<PathBuf>, U: Into<String>>(path: P, url: U) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }

    fn download(&self) -> Result<()> {
        log::info!("Downloading pose model from {}", self.url);

        let response = ureq::get(&self.url)
            .call()
            .map_err(|e| Error::ModelDownload(e.to_string()))?;
        let mut reader = response.into_reader();

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Write beside the target so the final rename stays on one filesystem
        let staging = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(staging.as_file());
            let bytes = io::copy(&mut reader, &mut writer).map_err(|e| Error::ModelDownload(e.to_string()))?;
            writer.flush()?;
            if bytes == 0 {
                return Err(Error::ModelDownload(format!("{} returned an empty body", self.url)));
            }
            log::info!("Pose model downloaded ({} bytes)", bytes);
        }
        staging
            .persist(&self.path)
            .map_err(|e| Error::IoError(format!("Failed to store pose model: {e}")))?;
        Ok(())
    }
}

impl ModelSource for CachedDownload {
    fn resolve(&self) -> Result<PathBuf> {
        if !self.path.is_file() {
            self.download()?;
        }
        Ok(self.path.clone())
    }
}

/// Check that a file looks like a usable model (exists and is non-empty)
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is empty
pub fn check_model_file(path: &Path) -> Result<()> {
    let len = File::open(path)?.metadata()?.len();
    if len == 0 {
        return Err(Error::ModelError(format!("Pose model is empty: {}", path.display())));
    }
    Ok(())
}
