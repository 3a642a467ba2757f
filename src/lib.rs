//! Capture → deduplicate → persist pipeline for OCR'd item panels.
//!
//! A [`worker::CaptureWorker`] polls a window region through an external OCR
//! engine and hands records to a [`session::Session`], which keeps the unique
//! ones in a paged [`store::RecordStore`] and appends them to a date-grouped
//! log. [`cleaner::clean_log`] deduplicates that log offline.

pub mod capture;
pub mod cleaner;
pub mod config;
pub mod console;
pub mod engine;
pub mod engines;
pub mod error;
pub mod record;
pub mod session;
pub mod store;
pub mod worker;
pub mod writer;
