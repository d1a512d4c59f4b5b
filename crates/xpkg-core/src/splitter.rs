//! Splits a YAML stream into documents.
//!
//! A document starts after a `---` line and ends at the next `---` line, a
//! `...` line, or the end of the stream. Marker lines never appear in the
//! yielded bytes, and documents with no bytes between markers are not yielded
//! at all. Either marker may be followed by a comment; any other text after
//! `---` is an error.

use std::io::{self, BufRead};

/// Document start marker.
pub const DOCUMENT_START: &str = "---";

/// Document end marker.
pub const DOCUMENT_END: &str = "...";

/// Comment prefix.
pub const COMMENT: char = '#';

/// What a single line means to the splitter.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Start,
    End,
    Content,
}

/// Whether the text after `---` leaves the line a document marker: nothing,
/// or a comment.
fn start_tail_is_bare(rest: &str) -> bool {
    let rest = rest.trim();
    rest.is_empty() || rest.starts_with(COMMENT)
}

/// A `---` line, optionally followed by a comment.
pub(crate) fn is_start_marker(text: &str) -> bool {
    text.strip_prefix(DOCUMENT_START).is_some_and(start_tail_is_bare)
}

/// A `...` line, optionally followed by whitespace and a comment. Anything
/// else after the dots (`....`, `...x`) is ordinary content.
pub(crate) fn is_end_marker(text: &str) -> bool {
    text.strip_prefix(DOCUMENT_END).is_some_and(|rest| {
        let trimmed = rest.trim();
        trimmed.is_empty()
            || (rest.starts_with(char::is_whitespace) && trimmed.starts_with(COMMENT))
    })
}

fn classify(line: &[u8]) -> io::Result<Line> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end();
    if let Some(rest) = text.strip_prefix(DOCUMENT_START) {
        if start_tail_is_bare(rest) {
            return Ok(Line::Start);
        }
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid document separator: {text}"),
        ));
    }
    if is_end_marker(text) {
        return Ok(Line::End);
    }
    Ok(Line::Content)
}

/// Lazy, one-shot iterator over the documents in a stream.
///
/// The first read error (other than end of stream) is yielded once and the
/// iterator is exhausted afterwards.
#[derive(Debug)]
pub struct DocumentReader<R> {
    reader: R,
    line: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> DocumentReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            finished: false,
        }
    }

    /// The underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Read the next document, or `None` at end of stream.
    pub fn read_document(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }

        let mut document = Vec::new();
        loop {
            self.line.clear();
            let n = match self.reader.read_until(b'\n', &mut self.line) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            };

            if n == 0 {
                self.finished = true;
                return Ok((!document.is_empty()).then_some(document));
            }

            let line = match classify(&self.line) {
                Ok(line) => line,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            };

            match line {
                Line::Start | Line::End if document.is_empty() => continue,
                Line::Start | Line::End => return Ok(Some(document)),
                Line::Content => document.extend_from_slice(&self.line),
            }
        }
    }
}

impl<R: BufRead> Iterator for DocumentReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_document().transpose()
    }
}
