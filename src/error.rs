use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("No text found in image")]
    NoText,

    #[error("Recognizer returned {found} fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },

    #[error("I/O error while talking to OCR engine: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Target window not found: {0}")]
    WindowNotFound(String),

    #[error("Failed to capture window: {0}")]
    CaptureFailed(String),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Capture worker already started")]
    AlreadyStarted,

    #[error("Failed to spawn capture worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Engine(#[from] OcrError),
}

#[derive(Error, Debug)]
#[error("Failed to append to {path}: {source}")]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error while cleaning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cleanup refused while capture is running; pause capture first")]
    CaptureActive,
}

impl CleanupError {
    pub(crate) fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            CleanupError::NotFound(path.to_path_buf())
        } else {
            CleanupError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Short machine-readable code, used by the CLI when reporting.
    pub fn code(&self) -> &'static str {
        match self {
            CleanupError::NotFound(_) => "NOT_FOUND",
            CleanupError::Io { .. } => "IO_ERROR",
            CleanupError::CaptureActive => "CAPTURE_ACTIVE",
        }
    }
}
