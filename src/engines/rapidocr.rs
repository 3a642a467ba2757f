//! RapidOCR-json engine implementation
//!
//! Drives the external RapidOCR-json executable over its line protocol: one
//! JSON request per line on stdin, one JSON reply per line on stdout.

use crate::config::EngineConfig;
use crate::engine::Recognizer;
use crate::error::OcrError;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Reply code for a successful recognition
const CODE_OK: i64 = 100;
/// Reply code when the image contains no text
const CODE_NO_TEXT: i64 = 101;
/// Marker the engine prints once its models are loaded
const READY_MARKER: &str = "init completed";

#[derive(Serialize)]
struct Request<'a> {
    image_path: &'a Path,
}

#[derive(Deserialize)]
struct Reply {
    code: i64,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct TextBlock {
    text: String,
}

/// OCR engine backed by a RapidOCR-json child process
pub struct RapidOcrEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    scratch: tempfile::TempDir,
}

impl RapidOcrEngine {
    /// Start the engine process and wait until it reports ready.
    ///
    /// A missing executable is an initialization error, never retried.
    pub fn new(config: &EngineConfig) -> Result<Self, OcrError> {
        if !config.path.exists() {
            return Err(OcrError::InitializationError(format!(
                "engine not found at {}",
                config.path.display()
            )));
        }

        tracing::info!("Starting OCR engine {:?}...", config.path);

        let scratch = tempfile::Builder::new()
            .prefix("relic-recorder")
            .tempdir()
            .map_err(|e| {
                OcrError::InitializationError(format!("Failed to create scratch dir: {}", e))
            })?;

        let mut command = Command::new(&config.path);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = working_dir(&config.path) {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            OcrError::InitializationError(format!("Failed to start engine: {}", e))
        })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OcrError::InitializationError("Engine pipes unavailable".to_string()));
            }
        };

        let mut engine = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            scratch,
        };
        engine.wait_ready()?;

        tracing::info!("OCR engine initialized successfully");
        Ok(engine)
    }

    fn wait_ready(&mut self) -> Result<(), OcrError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.stdout.read_line(&mut line).map_err(|e| {
                OcrError::InitializationError(format!("Failed to read engine output: {}", e))
            })?;
            if read == 0 {
                return Err(OcrError::InitializationError(
                    "Engine exited before it was ready".to_string(),
                ));
            }
            tracing::debug!("engine: {}", line.trim_end());
            if line.to_lowercase().contains(READY_MARKER) {
                return Ok(());
            }
        }
    }

    fn scratch_image(&self) -> PathBuf {
        self.scratch.path().join("capture.png")
    }
}

/// Engines resolve their model files relative to their own directory.
fn working_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Turn one reply line into the recognized fields.
pub fn parse_reply(line: &str) -> Result<Vec<String>, OcrError> {
    let reply: Reply = serde_json::from_str(line.trim())
        .map_err(|e| OcrError::ProcessingError(format!("Malformed engine reply: {}", e)))?;

    match reply.code {
        CODE_OK => {
            let blocks: Vec<TextBlock> = serde_json::from_value(reply.data).map_err(|e| {
                OcrError::ProcessingError(format!("Unexpected engine data: {}", e))
            })?;
            if blocks.is_empty() {
                return Err(OcrError::NoText);
            }
            Ok(blocks.into_iter().map(|b| b.text).collect())
        }
        CODE_NO_TEXT => Err(OcrError::NoText),
        code => Err(OcrError::ProcessingError(format!(
            "Engine returned code {}: {}",
            code, reply.data
        ))),
    }
}

impl Recognizer for RapidOcrEngine {
    fn name(&self) -> &'static str {
        "rapidocr-json"
    }

    fn description(&self) -> &'static str {
        "RapidOCR-json external process, JSON line protocol"
    }

    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        let image_path = self.scratch_image();
        image
            .save_with_format(&image_path, ImageFormat::Png)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write capture: {}", e)))?;

        let request = serde_json::to_string(&Request {
            image_path: &image_path,
        })
        .map_err(|e| OcrError::ProcessingError(format!("Failed to encode request: {}", e)))?;

        writeln!(self.stdin, "{}", request)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(OcrError::ProcessingError("Engine closed its output".to_string()));
        }

        parse_reply(&line)
    }
}

impl Drop for RapidOcrEngine {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
