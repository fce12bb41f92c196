//! Parsing of a copy attempt's line-oriented progress channel.
//!
//! `dd status=progress` writes its running byte counts to stderr as
//! carriage-return-redrawn lines, then its final `N+M records in` /
//! `records out` accounting as newline-terminated lines. [`Segments`] splits
//! that stream on either delimiter, keeping the delimiter in the yielded
//! segment so a verbatim echo reproduces the live redraw exactly, and
//! [`parse_records_in`] extracts the transferred-sector count the engine
//! needs to account for a partially successful attempt.

use regex::Regex;
use std::io::{self, BufRead};
use std::sync::OnceLock;

static RECORDS_IN: OnceLock<Regex> = OnceLock::new();

/// Extracts the sector count from a `"<count>+<count2> records in"` segment.
///
/// The pattern is anchored at the start of the segment; anything else,
/// including the matching `records out` line, yields `None`.
pub fn parse_records_in(segment: &str) -> Option<u64> {
    let re = RECORDS_IN
        .get_or_init(|| Regex::new(r"^(\d+)\+\d+ records in").expect("static pattern compiles"));
    re.captures(segment)?.get(1)?.as_str().parse().ok()
}

/// An iterator over the `\r`- or `\n`-delimited segments of a byte stream.
///
/// Each yielded segment includes its trailing delimiter. A final
/// unterminated segment is yielded when the stream closes; the iterator then
/// ends. Segments are decoded lossily, since dd's stderr is not guaranteed
/// to be valid UTF-8 at every split point.
pub struct Segments<R> {
    reader: R,
}

impl<R: BufRead> Segments<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Iterator for Segments<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut segment = Vec::new();
        loop {
            let (done, used) = {
                let available = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) => return Some(Err(e)),
                };
                if available.is_empty() {
                    if segment.is_empty() {
                        return None;
                    }
                    (true, 0)
                } else if let Some(i) = available
                    .iter()
                    .position(|&b| b == b'\r' || b == b'\n')
                {
                    segment.extend_from_slice(&available[..=i]);
                    (true, i + 1)
                } else {
                    segment.extend_from_slice(available);
                    (false, available.len())
                }
            };
            self.reader.consume(used);
            if done {
                return Some(Ok(String::from_utf8_lossy(&segment).into_owned()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &str) -> Vec<String> {
        Segments::new(Cursor::new(input.as_bytes().to_vec()))
            .map(|segment| segment.unwrap())
            .collect()
    }

    #[test]
    fn splits_on_both_delimiters_keeping_them() {
        assert_eq!(
            collect("524288 bytes copied\r1024+0 records in\n1024+0 records out\n"),
            vec![
                "524288 bytes copied\r",
                "1024+0 records in\n",
                "1024+0 records out\n",
            ],
        );
    }

    #[test]
    fn unterminated_tail_is_yielded_at_eof() {
        assert_eq!(collect("a\rtail"), vec!["a\r", "tail"]);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn consecutive_delimiters_yield_bare_segments() {
        assert_eq!(collect("a\r\nb\n"), vec!["a\r", "\n", "b\n"]);
    }

    #[test]
    fn parses_records_in_count() {
        assert_eq!(parse_records_in("1234+0 records in"), Some(1234));
        assert_eq!(parse_records_in("7+1 records in\n"), Some(7));
    }

    #[test]
    fn rejects_non_matching_segments() {
        assert_eq!(parse_records_in("1234+0 records out"), None);
        assert_eq!(parse_records_in("524288 bytes (524 kB) copied"), None);
        assert_eq!(parse_records_in("dd: error reading '/dev/sda'"), None);
        assert_eq!(parse_records_in(" 12+0 records in"), None);
    }
}
