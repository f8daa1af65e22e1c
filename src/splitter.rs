//! Incremental delimiter-based record splitting.

use crate::error::{Error, Result};

/// Accumulates bytes and extracts complete delimiter-terminated records.
///
/// Bytes after the last delimiter seen are kept as a pending fragment and
/// prefixed to the next chunk, so records (and multi-byte delimiters) split
/// across read boundaries are still recognized. A fragment is never emitted
/// on its own, not even at end of file.
#[derive(Debug, Clone)]
pub struct Splitter {
    delimiter: Vec<u8>,
    pending: Vec<u8>,
    // Offset into `pending` before which no delimiter can start.
    scan_from: usize,
}

impl Splitter {
    pub fn new(delimiter: impl Into<Vec<u8>>) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(Error::EmptyDelimiter);
        }
        Ok(Self {
            delimiter,
            pending: Vec::new(),
            scan_from: 0,
        })
    }

    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    /// Bytes received but not yet part of a complete record.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Appends `chunk` and returns every record it completes, in order.
    ///
    /// Consecutive delimiters yield empty records.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let mut records = Vec::new();
        let mut record_start = 0;
        let mut cursor = self.scan_from;

        while let Some(found) = find_delimiter(&self.pending[cursor..], &self.delimiter) {
            let at = cursor + found;
            records.push(self.pending[record_start..at].to_vec());
            record_start = at + self.delimiter.len();
            cursor = record_start;
        }

        self.pending.drain(..record_start);
        // A delimiter prefix may sit at the tail of the fragment.
        self.scan_from = self
            .pending
            .len()
            .saturating_sub(self.delimiter.len() - 1);

        records
    }

    /// Drops the pending fragment.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.scan_from = 0;
    }
}

fn find_delimiter(haystack: &[u8], delimiter: &[u8]) -> Option<usize> {
    match delimiter {
        [byte] => haystack.iter().position(|b| b == byte),
        _ => haystack
            .windows(delimiter.len())
            .position(|window| window == delimiter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(raw: &[&str]) -> Vec<Vec<u8>> {
        raw.iter().map(|r| r.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_newline_records() {
        let mut splitter = Splitter::new("\n").unwrap();
        assert_eq!(
            splitter.push(b"line1\nline2\nline3\n"),
            records(&["line1", "line2", "line3"])
        );
        assert!(splitter.pending().is_empty());
    }

    #[test]
    fn test_empty_records_are_kept() {
        let mut splitter = Splitter::new("\n").unwrap();
        assert_eq!(
            splitter.push(b"a\n\n\nb\n"),
            records(&["a", "", "", "b"])
        );
    }

    #[test]
    fn test_whitespace_records_are_not_trimmed() {
        let mut splitter = Splitter::new("\n").unwrap();
        assert_eq!(splitter.push(b"  \n\tx \n"), records(&["  ", "\tx "]));
    }

    #[test]
    fn test_trailing_fragment_is_held_back() {
        let mut splitter = Splitter::new("\n").unwrap();
        assert_eq!(splitter.push(b"one\ntw"), records(&["one"]));
        assert_eq!(splitter.pending(), b"tw");

        assert!(splitter.push(b"o").is_empty());
        assert_eq!(splitter.pending(), b"two");

        assert_eq!(splitter.push(b"\n"), records(&["two"]));
        assert!(splitter.pending().is_empty());
    }

    #[test]
    fn test_no_delimiter_yields_nothing() {
        let mut splitter = Splitter::new("\n").unwrap();
        assert!(splitter.push(b"single_line_content").is_empty());
        assert_eq!(splitter.pending(), b"single_line_content");
    }

    #[test]
    fn test_custom_single_byte_delimiter() {
        let mut splitter = Splitter::new("-").unwrap();
        assert_eq!(splitter.push(b"one-two-"), records(&["one", "two"]));
    }

    #[test]
    fn test_multi_byte_delimiter() {
        let mut splitter = Splitter::new("<<>>").unwrap();
        assert_eq!(
            splitter.push(b"part1<<>>part2<<>>part3"),
            records(&["part1", "part2"])
        );
        assert_eq!(splitter.pending(), b"part3");
    }

    #[test]
    fn test_multi_byte_delimiter_split_across_chunks() {
        let mut splitter = Splitter::new("\r\n").unwrap();
        assert!(splitter.push(b"alpha\r").is_empty());
        assert_eq!(splitter.push(b"\nbeta\r"), records(&["alpha"]));
        assert_eq!(splitter.push(b"\n"), records(&["beta"]));
    }

    #[test]
    fn test_delimiter_delivered_one_byte_at_a_time() {
        let mut splitter = Splitter::new("<<>>").unwrap();
        let mut out = Vec::new();
        for byte in b"ab<<>>cd<<>>" {
            out.extend(splitter.push(&[*byte]));
        }
        assert_eq!(out, records(&["ab", "cd"]));
        assert!(splitter.pending().is_empty());
    }

    #[test]
    fn test_overlapping_delimiter_prefix() {
        // "aab" must match even though the first "a" starts a failed match.
        let mut splitter = Splitter::new("ab").unwrap();
        assert_eq!(splitter.push(b"xaaby"), records(&["xa"]));
        assert_eq!(splitter.pending(), b"y");
    }

    #[test]
    fn test_binary_content() {
        let mut splitter = Splitter::new(vec![0u8]).unwrap();
        assert_eq!(
            splitter.push(&[0xff, 0xfe, 0, 0x80, 0]),
            vec![vec![0xff, 0xfe], vec![0x80]]
        );
    }

    #[test]
    fn test_clear_drops_fragment() {
        let mut splitter = Splitter::new("\n").unwrap();
        splitter.push(b"stale");
        splitter.clear();
        assert!(splitter.pending().is_empty());
        assert_eq!(splitter.push(b"fresh\n"), records(&["fresh"]));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        assert!(matches!(Splitter::new(""), Err(Error::EmptyDelimiter)));
    }

    #[test]
    fn test_rejoined_records_match_input() {
        let input = b"a,bb,,ccc,dddd,tail";
        let mut splitter = Splitter::new(",").unwrap();
        let mut emitted = Vec::new();
        for chunk in input.chunks(3) {
            emitted.extend(splitter.push(chunk));
        }

        let mut rejoined = Vec::new();
        for record in &emitted {
            rejoined.extend_from_slice(record);
            rejoined.push(b',');
        }
        rejoined.extend_from_slice(splitter.pending());
        assert_eq!(rejoined, input);
    }
}
