//! Optical character recognition through the `tesseract` CLI
//!
//! Recognition runs out of process so a slow page never occupies a runtime
//! worker; the child is killed if the timeout elapses first.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::ChatConfig;
use crate::error::ChatError;

/// Extracts raw text from an image file
#[async_trait]
pub trait TextRecognizer: Send + Sync {
  async fn recognize(&self, image_path: &Path) -> Result<String, ChatError>;
}

pub struct TesseractRecognizer {
  binary: String,
  language: String,
  timeout_secs: u64,
}

impl TesseractRecognizer {
  pub fn new(config: &ChatConfig) -> Self {
    Self {
      binary: config.tesseract_bin.clone(),
      language: config.ocr_language.clone(),
      timeout_secs: config.ocr_timeout_secs,
    }
  }

  /// Arguments: single uniform block of text, keep interword spacing
  fn build_command(&self, image_path: &Path) -> Command {
    let mut command = Command::new(&self.binary);
    command
      .arg(image_path)
      .arg("stdout")
      .args(["-l", self.language.as_str()])
      .args(["--psm", "6"])
      .args(["-c", "preserve_interword_spaces=1"])
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    command
  }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
  async fn recognize(&self, image_path: &Path) -> Result<String, ChatError> {
    let child = self.build_command(image_path).spawn().map_err(|e| ChatError::Recognition {
      message: format!("failed to start {}: {e}", self.binary),
    })?;

    let output = timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output())
      .await
      .map_err(|_| ChatError::EndpointTimeout {
        endpoint: self.binary.clone(),
        seconds: self.timeout_secs,
      })??;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ChatError::Recognition {
        message: format!("{} exited with {}: {}", self.binary, output.status, stderr.trim()),
      });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}
