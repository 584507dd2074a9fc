pub const NULL_TEXT: &str = "NULL";
pub const TRUNCATION_MARKER: &str = "-- output truncated --";

/// Flattens one row: cells separated by a single space, absent cells shown
/// as `NULL`, terminated by a newline.
#[must_use]
pub fn flatten_row(cells: &[Option<String>]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| cell.as_deref().unwrap_or(NULL_TEXT))
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

/// Text dump of a table's rows with a fixed byte capacity.
///
/// Once a row does not fit, the part that fits is kept (cut on a char
/// boundary), the buffer is marked truncated, and every later row is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDataBuffer {
    capacity: usize,
    text: String,
    rows_appended: usize,
    truncated: bool,
}

impl TableDataBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0,
            "table data buffer capacity must be greater than 0"
        );
        Self {
            capacity,
            text: String::new(),
            rows_appended: 0,
            truncated: false,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of rows stored completely.
    #[must_use]
    pub fn rows_appended(&self) -> usize {
        self.rows_appended
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Returns `false` when the row did not fit completely.
    pub fn append_row(&mut self, cells: &[Option<String>]) -> bool {
        if self.truncated {
            return false;
        }

        let line = flatten_row(cells);
        let remaining = self.capacity - self.text.len();
        if line.len() <= remaining {
            self.text.push_str(&line);
            self.rows_appended += 1;
            return true;
        }

        let mut cut = remaining;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&line[..cut]);
        self.truncated = true;
        false
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.rows_appended = 0;
        self.truncated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{flatten_row, TableDataBuffer};

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|value| value.map(str::to_string)).collect()
    }

    #[test]
    fn null_cells_are_rendered_as_null_text() {
        let row = cells(&[Some("a"), None, Some("b")]);
        assert_eq!(flatten_row(&row), "a NULL b\n");
    }

    #[test]
    fn empty_row_is_just_a_newline() {
        assert_eq!(flatten_row(&[]), "\n");
    }

    #[test]
    fn rows_accumulate_line_by_line() {
        let mut buffer = TableDataBuffer::new(64);
        assert!(buffer.append_row(&cells(&[Some("1"), Some("alice")])));
        assert!(buffer.append_row(&cells(&[Some("2"), None])));

        assert_eq!(buffer.as_str(), "1 alice\n2 NULL\n");
        assert_eq!(buffer.rows_appended(), 2);
        assert!(!buffer.is_truncated());
    }

    #[test]
    fn overflow_keeps_prefix_and_refuses_later_rows() {
        let mut buffer = TableDataBuffer::new(10);
        assert!(buffer.append_row(&cells(&[Some("abc")])));
        assert!(!buffer.append_row(&cells(&[Some("defghijk")])));
        assert!(!buffer.append_row(&cells(&[Some("x")])));

        assert_eq!(buffer.as_str(), "abc\ndefghi");
        assert_eq!(buffer.as_str().len(), 10);
        assert_eq!(buffer.rows_appended(), 1);
        assert!(buffer.is_truncated());
    }

    #[test]
    fn overflow_never_splits_a_multibyte_character() {
        let mut buffer = TableDataBuffer::new(4);
        assert!(!buffer.append_row(&cells(&[Some("aaé€")])));

        // "aa" (2 bytes) + "é" (2 bytes) fits, "€" (3 bytes) would not.
        assert_eq!(buffer.as_str(), "aaé");
        assert!(buffer.is_truncated());
    }

    #[test]
    fn clear_resets_truncation() {
        let mut buffer = TableDataBuffer::new(2);
        buffer.append_row(&cells(&[Some("long")]));
        buffer.clear();

        assert!(buffer.is_empty());
        assert!(!buffer.is_truncated());
        assert!(buffer.append_row(&cells(&[Some("x")])));
    }
}
