//! Background capture worker
//!
//! Runs capture → recognize on its own thread at a fixed cadence and hands
//! every recognized record to the consumer over an unbounded channel. The
//! worker never deduplicates; that belongs to the consumer.

use crate::capture::{ScreenCapture, WindowHandle};
use crate::config::Config;
use crate::engine::Recognizer;
use crate::engines;
use crate::error::{OcrError, WorkerError};
use crate::record::Record;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Lifecycle of the capture loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Running,
    Paused,
}

struct Shared {
    state: Mutex<WorkerState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> WorkerState {
        *self.lock()
    }

    /// Move `from` → `to`; other states are left alone.
    fn transition(&self, from: WorkerState, to: WorkerState) -> bool {
        let mut state = self.lock();
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }

    fn stop(&self) {
        *self.lock() = WorkerState::Stopped;
        self.wake.notify_all();
    }

    /// Sleep one interval; returns early only when stopped.
    fn sleep(&self, interval: Duration) -> WorkerState {
        let guard = self.lock();
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, interval, |s| *s != WorkerState::Stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Everything the loop owns once it runs
struct Job {
    window: WindowHandle,
    capture: Box<dyn ScreenCapture>,
    recognizer: Box<dyn Recognizer>,
    interval: Duration,
    sender: UnboundedSender<Record>,
}

impl Job {
    fn run(mut self, shared: Arc<Shared>) {
        tracing::info!("Capture worker started on {:?}", self.window.title);
        loop {
            match shared.state() {
                WorkerState::Stopped => break,
                WorkerState::Paused => {}
                WorkerState::Running => {
                    if !self.tick() {
                        tracing::warn!("Record consumer is gone, stopping capture");
                        shared.stop();
                        break;
                    }
                }
            }
            if shared.sleep(self.interval) == WorkerState::Stopped {
                break;
            }
        }
        tracing::info!("Capture worker stopped");
    }

    /// One capture attempt. Returns false once the consumer hung up.
    fn tick(&mut self) -> bool {
        let image = match self.capture.capture(&self.window) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Capture skipped: {}", e);
                return true;
            }
        };

        let record = match self
            .recognizer
            .recognize(&image)
            .and_then(Record::from_recognized)
        {
            Ok(record) => record,
            Err(OcrError::NoText) => {
                tracing::debug!("No text in capture");
                return true;
            }
            Err(e) => {
                tracing::warn!("Recognition skipped: {}", e);
                return true;
            }
        };

        tracing::info!("Recognized record: {}", record);
        self.sender.send(record).is_ok()
    }
}

/// Handle to the capture loop
pub struct CaptureWorker {
    shared: Arc<Shared>,
    job: Option<Job>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// Build a worker around an already initialized recognizer.
    ///
    /// Returns the receiving end the consumer reads records from.
    pub fn new(
        window: WindowHandle,
        capture: Box<dyn ScreenCapture>,
        recognizer: Box<dyn Recognizer>,
        interval: Duration,
    ) -> (Self, UnboundedReceiver<Record>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(WorkerState::Stopped),
                wake: Condvar::new(),
            }),
            job: Some(Job {
                window,
                capture,
                recognizer,
                interval,
                sender,
            }),
            handle: None,
        };
        (worker, receiver)
    }

    /// Build a worker with the configured OCR engine.
    ///
    /// Fails when the engine cannot be initialized; nothing is started then.
    pub fn with_engine(
        window: WindowHandle,
        capture: Box<dyn ScreenCapture>,
        config: &Config,
    ) -> Result<(Self, UnboundedReceiver<Record>), WorkerError> {
        let recognizer = engines::create(&config.engine)?;
        Ok(Self::new(window, capture, recognizer, config.poll_interval))
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state()
    }

    /// Spawn the capture thread. A worker runs at most once.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        let job = self.job.take().ok_or(WorkerError::AlreadyStarted)?;

        *self.shared.lock() = WorkerState::Running;
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("capture-worker".to_string())
            .spawn(move || job.run(shared))
            .map_err(|e| {
                *self.shared.lock() = WorkerState::Stopped;
                WorkerError::Spawn(e)
            })?;

        self.handle = Some(handle);
        Ok(())
    }

    pub fn pause(&self) {
        if self.shared.transition(WorkerState::Running, WorkerState::Paused) {
            tracing::info!("Capture paused");
        }
    }

    pub fn resume(&self) {
        if self.shared.transition(WorkerState::Paused, WorkerState::Running) {
            tracing::info!("Capture resumed");
        }
    }

    /// Start if never started, otherwise flip between running and paused.
    pub fn toggle(&mut self) -> Result<WorkerState, WorkerError> {
        match self.state() {
            WorkerState::Stopped => self.start()?,
            WorkerState::Paused => self.resume(),
            WorkerState::Running => self.pause(),
        }
        Ok(self.state())
    }

    /// Stop the loop and wait for the in-flight tick to finish.
    pub fn stop(&mut self) {
        self.shared.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Capture worker thread panicked");
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
