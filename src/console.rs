//! Line commands for the interactive `watch` loop
//!
//! Stands in for the start/pause button, page arrows and log buttons of a
//! graphical front end.

use crate::store::RecordStore;
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start, pause or resume capture
    Toggle,
    Previous,
    Next,
    /// Deduplicate the record log
    Clean,
    /// Create the record log if needed and show its path
    Open,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "start" | "toggle" => Ok(Self::Toggle),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "n" | "next" => Ok(Self::Next),
            "c" | "clean" => Ok(Self::Clean),
            "o" | "open" => Ok(Self::Open),
            "" | "show" => Ok(Self::Show),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command {:?} (h for help)", other)),
        }
    }
}

pub const HELP: &str = "\
commands:
  s  start / pause / resume capture
  p  previous page
  n  next page
  c  remove duplicate lines from the record log (pause first)
  o  create the record log if missing and print its path
  q  quit";

/// Text shown for the page under the cursor.
pub fn render_page(store: &RecordStore) -> String {
    let (Some(record), Some(page)) = (store.current_page(), store.page_number()) else {
        return "no records yet".to_string();
    };

    let mut out = format!("page {}/{}", page, store.len());
    for field in record.fields() {
        let _ = write!(out, "\n  {}", field);
    }
    out
}
