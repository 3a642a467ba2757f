use crate::error::PersistError;
use crate::record::Record;
use chrono::NaiveDate;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Prefix of the line marking the capture date of the records below it
pub const DATE_HEADER_PREFIX: &str = "日期: ";

pub fn date_header(date: NaiveDate) -> String {
    format!("{}{}", DATE_HEADER_PREFIX, date.format("%Y-%m-%d"))
}

/// Append-only writer for the record log.
///
/// Date headers are driven by what this writer has written in the current
/// process, never by the existing file contents.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    last_date: Option<NaiveDate>,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_date: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, preceded by a date header when the date changed.
    pub fn append(&mut self, record: &Record, date: NaiveDate) -> Result<(), PersistError> {
        let needs_header = self.last_date != Some(date);

        self.write_lines(record, needs_header.then_some(date))
            .map_err(|source| PersistError {
                path: self.path.clone(),
                source,
            })?;

        self.last_date = Some(date);
        tracing::debug!("Appended record to {:?}", self.path);
        Ok(())
    }

    fn write_lines(&self, record: &Record, header: Option<NaiveDate>) -> std::io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);

        if let Some(date) = header {
            writeln!(out, "{}", date_header(date))?;
        }
        writeln!(out, "{}", record.to_log_line())?;
        out.flush()
    }

    /// Create the log as an empty file if it does not exist yet.
    pub fn ensure_exists(&self) -> std::io::Result<()> {
        if !self.path.exists() {
            File::create(&self.path)?;
            tracing::info!("Created empty record log {:?}", self.path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(tag: &str) -> Record {
        Record::new(vec![
            tag.to_string(),
            "Plume".to_string(),
            "ATK".to_string(),
            "311".to_string(),
        ])
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_headers_only_on_date_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        let mut writer = LogWriter::new(&path);

        writer.append(&record("a"), day(1)).unwrap();
        writer.append(&record("b"), day(1)).unwrap();
        writer.append(&record("c"), day(2)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "日期: 2024-03-01\n\
             a Plume ATK 311 \n\
             b Plume ATK 311 \n\
             日期: 2024-03-02\n\
             c Plume ATK 311 \n"
        );
        assert_eq!(contents.matches(DATE_HEADER_PREFIX).count(), 2);
    }

    #[test]
    fn test_new_writer_repeats_header_for_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");

        LogWriter::new(&path).append(&record("a"), day(5)).unwrap();
        LogWriter::new(&path).append(&record("b"), day(5)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("日期: 2024-03-05").count(), 2);
    }

    #[test]
    fn test_failed_append_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("records.txt");
        let mut writer = LogWriter::new(&path);

        let err = writer.append(&record("a"), day(1)).unwrap_err();
        assert_eq!(err.path, path);
        // The date was never written, so the next success still gets a header
        fs::create_dir(dir.path().join("missing-dir")).unwrap();
        writer.append(&record("a"), day(1)).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("日期: 2024-03-01\n"));
    }

    #[test]
    fn test_ensure_exists_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        let writer = LogWriter::new(&path);

        writer.ensure_exists().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        fs::write(&path, "kept\n").unwrap();
        writer.ensure_exists().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }
}
