//! Capture boundary
//!
//! Locating the target window and grabbing its pixels live behind two small
//! traits. The bundled [`StillImageSource`] reads a fixed image from disk, which
//! is enough to drive the pipeline without a platform screenshot backend.

use crate::config::{CaptureConfig, Region};
use crate::error::CaptureError;
use image::{DynamicImage, GenericImageView};
use std::path::PathBuf;

/// A located window, as seen at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// One-shot lookup of the target window
pub trait WindowLocator {
    fn locate(&self) -> Option<WindowHandle>;
}

/// Synchronous grab of a window's contents
pub trait ScreenCapture: Send {
    fn capture(&mut self, window: &WindowHandle) -> Result<DynamicImage, CaptureError>;
}

/// Crop `image` to `region`, failing when the region leaves the image.
pub fn crop_to_region(image: &DynamicImage, region: Region) -> Result<DynamicImage, CaptureError> {
    let (w, h) = image.dimensions();
    let fits = region.x.checked_add(region.width).is_some_and(|r| r <= w)
        && region.y.checked_add(region.height).is_some_and(|b| b <= h);
    if !fits {
        return Err(CaptureError::CaptureFailed(format!(
            "region ({},{},{},{}) exceeds capture size {}x{}",
            region.x, region.y, region.width, region.height, w, h
        )));
    }
    Ok(image.crop_imm(region.x, region.y, region.width, region.height))
}

/// Capture source backed by an image file
#[derive(Debug, Clone)]
pub struct StillImageSource {
    title: String,
    path: Option<PathBuf>,
    region: Option<Region>,
}

impl StillImageSource {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            title: config.window_title.clone(),
            path: config.image.clone(),
            region: config.region,
        }
    }
}

impl WindowLocator for StillImageSource {
    fn locate(&self) -> Option<WindowHandle> {
        let path = self.path.as_ref()?;
        match image::image_dimensions(path) {
            Ok((width, height)) => {
                tracing::info!("Found window {:?} ({}x{})", self.title, width, height);
                Some(WindowHandle {
                    title: self.title.clone(),
                    width,
                    height,
                })
            }
            Err(e) => {
                tracing::warn!("Window {:?} not available from {:?}: {}", self.title, path, e);
                None
            }
        }
    }
}

impl ScreenCapture for StillImageSource {
    fn capture(&mut self, window: &WindowHandle) -> Result<DynamicImage, CaptureError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| CaptureError::WindowNotFound(window.title.clone()))?;

        let image = image::open(path)
            .map_err(|e| CaptureError::CaptureFailed(format!("Failed to load {:?}: {}", path, e)))?;

        match self.region {
            Some(region) => crop_to_region(&image, region),
            None => Ok(image),
        }
    }
}
