//! Text recognition for receipt images.
//!
//! The ledger only needs the recognized text. Engines are awaited once per
//! image and never retried; their error message is shown to the user as is.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Language used when none is configured (German receipts).
pub const DEFAULT_LANGUAGE: &str = "deu";

/// Text recognized from one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutput {
    pub text: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct OcrError {
    pub message: String,
}

impl OcrError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Anything that can turn an image into text.
#[allow(async_fn_in_trait)]
pub trait OcrEngine {
    async fn recognize(&self, image: &Path) -> Result<OcrOutput, OcrError>;
}

/// Runs the `tesseract` command-line program.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: language.into(),
        }
    }

    /// Use a specific tesseract executable instead of the one on `PATH`.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &Path) -> Result<OcrOutput, OcrError> {
        if !image.is_file() {
            return Err(OcrError::new(format!(
                "image not found: {}",
                image.display()
            )));
        }

        info!(image = %image.display(), language = %self.language, "running tesseract");
        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| {
                OcrError::new(format!("failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::new(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "tesseract finished");
        Ok(OcrOutput { text })
    }
}
