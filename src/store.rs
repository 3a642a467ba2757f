use crate::record::Record;

/// Outcome of offering a candidate to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Appended at the given index; the cursor now points at it
    Accepted(usize),
    /// Equal to a record already held
    Duplicate,
    /// Candidate had no fields
    Empty,
}

/// Ordered, deduplicated history of accepted records with a page cursor.
///
/// Owned by the consumer side only; the capture worker never touches it.
#[derive(Debug, Default)]
pub struct RecordStore {
    pages: Vec<Record>,
    cursor: usize,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, candidate: Record) -> Insertion {
        if candidate.is_empty() {
            return Insertion::Empty;
        }
        if self.pages.contains(&candidate) {
            return Insertion::Duplicate;
        }
        self.pages.push(candidate);
        self.cursor = self.pages.len() - 1;
        Insertion::Accepted(self.cursor)
    }

    pub fn previous_page(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        if self.cursor + 1 < self.pages.len() {
            self.cursor += 1;
        }
    }

    /// Record under the cursor, `None` while nothing has been accepted.
    pub fn current_page(&self) -> Option<&Record> {
        self.pages.get(self.cursor)
    }

    /// Cursor position, `None` while the store is empty.
    pub fn cursor(&self) -> Option<usize> {
        if self.pages.is_empty() {
            None
        } else {
            Some(self.cursor)
        }
    }

    /// 1-based page number for display
    pub fn page_number(&self) -> Option<usize> {
        self.cursor().map(|c| c + 1)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str) -> Record {
        Record::new(vec![
            tag.to_string(),
            "Flower".to_string(),
            "HP".to_string(),
            "4780".to_string(),
        ])
    }

    fn assert_cursor_valid(store: &RecordStore) {
        match store.cursor() {
            Some(c) => assert!(c < store.len(), "cursor {} out of range {}", c, store.len()),
            None => assert!(store.is_empty()),
        }
    }

    #[test]
    fn test_empty_store_has_no_page() {
        let mut store = RecordStore::new();
        assert!(store.current_page().is_none());
        assert_eq!(store.cursor(), None);
        store.previous_page();
        store.next_page();
        assert!(store.current_page().is_none());
        assert_cursor_valid(&store);
    }

    #[test]
    fn test_same_record_twice_kept_once() {
        let mut store = RecordStore::new();
        assert_eq!(store.insert(record("a")), Insertion::Accepted(0));
        assert_eq!(store.insert(record("a")), Insertion::Duplicate);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_candidate_ignored() {
        let mut store = RecordStore::new();
        assert_eq!(store.insert(Record::new(Vec::new())), Insertion::Empty);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_moves_cursor_to_last() {
        let mut store = RecordStore::new();
        store.insert(record("a"));
        store.insert(record("b"));
        store.previous_page();
        assert_eq!(store.cursor(), Some(0));
        store.insert(record("c"));
        assert_eq!(store.cursor(), Some(2));
        assert_eq!(store.current_page(), Some(&record("c")));
    }

    #[test]
    fn test_duplicate_leaves_cursor() {
        let mut store = RecordStore::new();
        store.insert(record("a"));
        store.insert(record("b"));
        store.previous_page();
        store.insert(record("b"));
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn test_pagination_clamps_at_bounds() {
        let mut store = RecordStore::new();
        for tag in ["a", "b", "c"] {
            store.insert(record(tag));
        }
        store.next_page();
        assert_eq!(store.cursor(), Some(2));

        store.previous_page();
        store.previous_page();
        store.previous_page();
        assert_eq!(store.cursor(), Some(0));
        assert_eq!(store.current_page(), Some(&record("a")));
        assert_eq!(store.page_number(), Some(1));
    }

    #[test]
    fn test_mixed_operations_keep_invariants() {
        let mut store = RecordStore::new();
        // Deterministic pseudo-random walk over insert/prev/next
        let mut state: u32 = 7;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (state >> 16) % 3 {
                0 => {
                    let tag = ((state >> 8) % 6).to_string();
                    store.insert(record(&tag));
                }
                1 => store.previous_page(),
                _ => store.next_page(),
            }
            assert_cursor_valid(&store);
        }

        let records = store.records();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(store.len() <= 6);
    }
}
