//! OCR engine implementations
//!
//! Implementations of the [`Recognizer`] trait for external OCR backends.

pub mod rapidocr;

use crate::config::EngineConfig;
use crate::engine::Recognizer;
use crate::error::OcrError;

/// Start the configured OCR engine.
///
/// Fails with [`OcrError::InitializationError`] when the engine cannot be
/// brought up; callers must not start capture in that case.
pub fn create(config: &EngineConfig) -> Result<Box<dyn Recognizer>, OcrError> {
    tracing::info!("Initializing rapidocr-json engine...");
    let engine = rapidocr::RapidOcrEngine::new(config)?;
    tracing::info!("Using OCR engine {} ({})", engine.name(), engine.description());
    Ok(Box::new(engine))
}
