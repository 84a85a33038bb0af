//! `wkhtmltopdf` PDF generator
//!
//! Implements `PdfGeneratorPort` by piping HTML into the `wkhtmltopdf` CLI
//! and reading the PDF back from its stdout.
//!
//! # Prerequisites
//!
//! - `wkhtmltopdf` (patched Qt build recommended) installed and available in
//!   PATH, or `pdf.executable_path` pointing at it
//!
//! The process is killed if the request that started it is dropped; there is
//! no other timeout.

use std::process::Stdio;

use application::ApplicationError;
use application::ports::PdfGeneratorPort;
use async_trait::async_trait;
use domain::{PdfJob, ReadySignal};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::config::PdfConfig;

/// PDF generator backed by the `wkhtmltopdf` executable
#[derive(Debug, Clone)]
pub struct WkhtmltopdfAdapter {
    config: PdfConfig,
}

impl WkhtmltopdfAdapter {
    /// Create a new adapter
    #[must_use]
    pub const fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    fn executable(&self) -> &str {
        &self.config.executable_path
    }

    /// Command-line arguments for one job, reading stdin and writing stdout
    #[must_use]
    pub fn build_args(job: &PdfJob) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--dpi".to_string(),
            job.dpi.to_string(),
        ];
        if !job.collate {
            args.push("--no-collate".to_string());
        }
        args.push("--page-size".to_string());
        args.push(job.page_size.as_str().to_string());
        if let Some(margin) = job.margin_mm {
            for side in ["-T", "-B", "-L", "-R"] {
                args.push(side.to_string());
                args.push(format!("{margin}mm"));
            }
        }
        args.push("--orientation".to_string());
        args.push(job.orientation.as_str().to_string());

        // Page options follow the page argument
        args.push("page".to_string());
        args.push("-".to_string());
        match &job.ready {
            ReadySignal::WindowStatus(flag) => {
                args.push("--window-status".to_string());
                args.push(flag.clone());
            },
            ReadySignal::JavascriptDelay(ms) => {
                args.push("--javascript-delay".to_string());
                args.push(ms.to_string());
            },
        }
        if job.debug_javascript {
            args.push("--debug-javascript".to_string());
        }
        if !job.stop_slow_scripts {
            args.push("--no-stop-slow-scripts".to_string());
        }

        args.push("-".to_string());
        args
    }
}

#[async_trait]
impl PdfGeneratorPort for WkhtmltopdfAdapter {
    #[instrument(skip(self, html, job), fields(html_len = html.len()))]
    async fn generate(&self, html: &str, job: &PdfJob) -> Result<Vec<u8>, ApplicationError> {
        let mut cmd = Command::new(self.executable());
        cmd.args(Self::build_args(job))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running wkhtmltopdf: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ApplicationError::PdfGeneration(format!(
                    "wkhtmltopdf not found at '{}'",
                    self.executable()
                ))
            } else {
                ApplicationError::PdfGeneration(format!("Failed to run wkhtmltopdf: {e}"))
            }
        })?;

        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(html.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|e| {
            ApplicationError::PdfGeneration(format!("Failed to wait for wkhtmltopdf: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = %output.status, stderr = %stderr.trim(), "wkhtmltopdf exited with failure");
            return Err(ApplicationError::PdfGeneration(format!(
                "wkhtmltopdf exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        written.map_err(|e| {
            ApplicationError::PdfGeneration(format!("Failed to write to wkhtmltopdf stdin: {e}"))
        })?;

        if output.stdout.is_empty() {
            return Err(ApplicationError::PdfGeneration(
                "wkhtmltopdf produced empty output".to_string(),
            ));
        }

        Ok(output.stdout)
    }

    async fn is_available(&self) -> bool {
        Command::new(self.executable())
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|s| s.success())
    }
}
