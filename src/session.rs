//! Consumer side of the pipeline
//!
//! The session is the single owner of the record store and the log writer.
//! Every delivered record goes through [`Session::accept`] on the consumer
//! thread, one at a time, so neither needs locking.

use crate::cleaner::{self, CleanReport};
use crate::error::{CleanupError, PersistError};
use crate::record::Record;
use crate::store::{Insertion, RecordStore};
use crate::worker::WorkerState;
use crate::writer::LogWriter;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Called whenever the page under the cursor may have changed
pub type PageObserver = Box<dyn FnMut(&RecordStore)>;

/// What happened to one delivered record
#[derive(Debug)]
pub struct Acceptance {
    pub insertion: Insertion,
    /// Set when the record was accepted but could not be written to the log.
    /// The record stays in the store either way.
    pub persist_error: Option<PersistError>,
}

impl Acceptance {
    pub fn is_new(&self) -> bool {
        matches!(self.insertion, Insertion::Accepted(_))
    }
}

pub struct Session {
    store: RecordStore,
    writer: LogWriter,
    observer: Option<PageObserver>,
}

impl Session {
    pub fn new(record_log: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::new(),
            writer: LogWriter::new(record_log),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: PageObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn record_log(&self) -> &Path {
        self.writer.path()
    }

    /// Accept a record captured today.
    pub fn accept_now(&mut self, record: Record) -> Acceptance {
        self.accept(record, Local::now().date_naive())
    }

    /// Insert into the store; a new record is persisted under `date` and the
    /// observer is told the page moved.
    pub fn accept(&mut self, record: Record, date: NaiveDate) -> Acceptance {
        let insertion = self.store.insert(record);
        let mut persist_error = None;

        if let Insertion::Accepted(index) = insertion {
            let accepted = &self.store.records()[index];
            if let Err(e) = self.writer.append(accepted, date) {
                tracing::error!("Failed to persist record: {}", e);
                persist_error = Some(e);
            }
            self.notify();
        } else {
            tracing::debug!("Ignored record: {:?}", insertion);
        }

        Acceptance {
            insertion,
            persist_error,
        }
    }

    pub fn previous_page(&mut self) {
        self.store.previous_page();
        self.notify();
    }

    pub fn next_page(&mut self) {
        self.store.next_page();
        self.notify();
    }

    pub fn current_page(&self) -> Option<&Record> {
        self.store.current_page()
    }

    /// Create the record log if it is missing and return its path.
    pub fn open_log(&self) -> std::io::Result<&Path> {
        self.writer.ensure_exists()?;
        Ok(self.writer.path())
    }

    /// Deduplicate the record log. Refused while capture is running, since a
    /// rewrite racing an append has no defined outcome.
    pub fn run_cleanup(&self, worker: WorkerState) -> Result<CleanReport, CleanupError> {
        if worker == WorkerState::Running {
            return Err(CleanupError::CaptureActive);
        }
        cleaner::clean_log(self.writer.path())
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.store);
        }
    }
}
