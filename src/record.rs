//! Captured records
//!
//! A record is the ordered list of text fields recognized in one capture,
//! after the non-informative field at [`DROPPED_FIELD_INDEX`] has been removed.

use crate::error::OcrError;
use std::fmt;

/// Position of the field the recognizer always returns but which carries no
/// information about the captured item.
pub const DROPPED_FIELD_INDEX: usize = 4;

/// Number of fields a record keeps once the dropped field is removed.
pub const RECORD_ARITY: usize = 4;

/// One capture's text fields. Equality is exact, field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Build a record from raw recognizer output by dropping field 4.
    pub fn from_recognized(mut fields: Vec<String>) -> Result<Self, OcrError> {
        if fields.len() <= DROPPED_FIELD_INDEX {
            return Err(OcrError::TooFewFields {
                found: fields.len(),
                expected: DROPPED_FIELD_INDEX + 1,
            });
        }
        fields.remove(DROPPED_FIELD_INDEX);
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a log line: every field followed by one space, no newline.
    pub fn to_log_line(&self) -> String {
        let mut line = String::new();
        for field in &self.fields {
            line.push_str(field);
            line.push(' ');
        }
        line
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_recognized_drops_fifth_field() {
        let record =
            Record::from_recognized(raw(&["Gladiator", "Flower", "HP", "4780", "+20", "ATK 5%"]))
                .unwrap();
        assert_eq!(record.fields(), &raw(&["Gladiator", "Flower", "HP", "4780", "ATK 5%"])[..]);
    }

    #[test]
    fn test_from_recognized_five_fields_leaves_four() {
        let record = Record::from_recognized(raw(&["a", "b", "c", "d", "level"])).unwrap();
        assert_eq!(record.fields().len(), RECORD_ARITY);
        assert_eq!(record.fields(), &raw(&["a", "b", "c", "d"])[..]);
    }

    #[test]
    fn test_from_recognized_rejects_short_output() {
        let err = Record::from_recognized(raw(&["a", "b", "c", "d"])).unwrap_err();
        assert!(matches!(
            err,
            OcrError::TooFewFields {
                found: 4,
                expected: 5
            }
        ));
    }

    #[test]
    fn test_log_line_has_trailing_space() {
        let record = Record::new(raw(&["a", "b", "c", "d"]));
        assert_eq!(record.to_log_line(), "a b c d ");
    }

    #[test]
    fn test_equality_is_exact() {
        let a = Record::new(raw(&["ATK", "5%"]));
        let b = Record::new(raw(&["ATK ", "5%"]));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
