//! Offline deduplication of the record log
//!
//! Live deduplication compares records exactly, so OCR drift in whitespace or
//! punctuation lets near-identical lines into the log. Cleanup compares lines
//! by a normalized key instead and keeps the first line of every key, with its
//! original text.

use crate::error::CleanupError;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

/// Matches a `+` sign in front of a digit (kept) or any character that is not
/// a word character, `%` or `.` (dropped, including a stray `+`).
///
/// Applied after whitespace is removed, so `+ 5` keeps its sign.
static KEY_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+(\d)|[^\w%.]").expect("normalization pattern is valid"));

/// Summary of one cleanup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub total_lines: usize,
    pub kept: usize,
    pub removed: usize,
}

/// Normalized form of a log line, used only to spot near-duplicates.
pub fn normalized_key(line: &str) -> String {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    KEY_NOISE_RE
        .replace_all(&compact, |caps: &Captures| match caps.get(1) {
            Some(digit) => format!("+{}", digit.as_str()),
            None => String::new(),
        })
        .into_owned()
}

/// Lines to keep, in order: the first line seen for each normalized key.
pub fn dedup_lines<'a, I>(lines: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(normalized_key(line)))
        .collect()
}

/// Rewrite the log at `path` without its near-duplicate lines.
///
/// The file is read whole and replaced through a temporary file in the same
/// directory, so a failure part way leaves the original untouched. Kept lines
/// are written back as read, trailing spaces of record lines included.
pub fn clean_log(path: &Path) -> Result<CleanReport, CleanupError> {
    let contents = fs::read_to_string(path).map_err(|e| CleanupError::from_io(path, e))?;

    if contents.is_empty() {
        tracing::info!("Record log {:?} is empty, nothing to clean", path);
        return Ok(CleanReport::default());
    }

    let lines: Vec<&str> = contents.lines().collect();
    let kept = dedup_lines(lines.iter().copied());

    let mut output = String::with_capacity(contents.len());
    for line in &kept {
        output.push_str(line);
        output.push('\n');
    }

    replace_file(path, output.as_bytes()).map_err(|e| CleanupError::from_io(path, e))?;

    let report = CleanReport {
        total_lines: lines.len(),
        kept: kept.len(),
        removed: lines.len() - kept.len(),
    };
    tracing::info!(
        "Removed {} duplicate lines from {:?} ({} kept)",
        report.removed,
        path,
        report.kept
    );
    Ok(report)
}

fn replace_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strips_whitespace() {
        assert_eq!(normalized_key("a b"), "ab");
        assert_eq!(normalized_key(" HP\t4780 "), "HP4780");
    }

    #[test]
    fn test_key_keeps_percent_and_dot() {
        assert_eq!(normalized_key("暴击率 +3.9% "), "暴击率+3.9%");
    }

    #[test]
    fn test_key_plus_only_before_digit() {
        assert_eq!(normalized_key("+20"), "+20");
        assert_eq!(normalized_key("ATK+"), "ATK");
        assert_eq!(normalized_key("++5"), "+5");
        assert_eq!(normalized_key("+ 5"), "+5");
        assert_eq!(normalized_key("HP +\t5"), "HP+5");
    }

    #[test]
    fn test_key_drops_other_punctuation() {
        assert_eq!(normalized_key("·攻击力*+5.8%"), "攻击力+5.8%");
        assert_eq!(normalized_key("日期: 2024-03-01"), "日期20240301");
        assert_eq!(normalized_key("snake_case"), "snake_case");
    }

    #[test]
    fn test_dedup_keeps_first_literal_text() {
        let kept = dedup_lines(["a b", "ab", "c"]);
        assert_eq!(kept, vec!["a b", "c"]);
    }

    #[test]
    fn test_dedup_sign_survives_space_before_digit() {
        let kept = dedup_lines(["HP + 5", "HP +5", "HP 5"]);
        assert_eq!(kept, vec!["HP + 5", "HP 5"]);
    }

    #[test]
    fn test_dedup_near_duplicates_from_ocr_drift() {
        let kept = dedup_lines([
            "日期: 2024-03-01",
            "角斗士 生之花 生命值 4780 ",
            "角斗士 生之花 生命值 4780",
            "角斗士·生之花 生命值 4780 ",
            "角斗士 死之羽 攻击力 311 ",
        ]);
        assert_eq!(
            kept,
            vec![
                "日期: 2024-03-01",
                "角斗士 生之花 生命值 4780 ",
                "角斗士 死之羽 攻击力 311 ",
            ]
        );
    }

    #[test]
    fn test_clean_log_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        fs::write(&path, "日期: 2024-03-01\na b c d \nabcd\ne f g h \n").unwrap();

        let report = clean_log(&path).unwrap();
        assert_eq!(
            report,
            CleanReport {
                total_lines: 4,
                kept: 3,
                removed: 1
            }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "日期: 2024-03-01\na b c d \ne f g h \n"
        );
    }

    #[test]
    fn test_clean_log_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        fs::write(
            &path,
            "日期: 2024-03-01\r\nx +1 \r\nx+1\r\ny ATK+ \r\ny ATK\r\n\r\n\r\nz",
        )
        .unwrap();

        clean_log(&path).unwrap();
        let once = fs::read(&path).unwrap();
        let report = clean_log(&path).unwrap();
        let twice = fs::read(&path).unwrap();

        assert_eq!(once, twice);
        assert_eq!(report.removed, 0);
        assert_eq!(
            String::from_utf8(once).unwrap(),
            "日期: 2024-03-01\nx +1 \ny ATK+ \n\nz\n"
        );
    }

    #[test]
    fn test_clean_log_empty_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        fs::write(&path, "").unwrap();

        assert_eq!(clean_log(&path).unwrap(), CleanReport::default());
        assert_eq!(fs::read(&path).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_clean_log_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = clean_log(&path).unwrap_err();
        assert!(matches!(err, CleanupError::NotFound(p) if p == path));
    }
}
