use crate::error::OcrError;
use image::DynamicImage;

/// Trait that all OCR backends must implement
///
/// Called from the capture worker thread only, so implementations may keep
/// mutable per-process state (pipes, scratch files).
pub trait Recognizer: Send {
    /// Returns the engine identifier (e.g., "rapidocr-json")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text fields of an image, in reading order.
    ///
    /// `Err(OcrError::NoText)` when the engine found nothing.
    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<String>, OcrError>;
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn description(&self) -> &'static str {
        (**self).description()
    }

    fn recognize(&mut self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        (**self).recognize(image)
    }
}
