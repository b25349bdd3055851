use std::io::{self, BufRead};

use memchr::memchr2;
use tracing::trace;

use crate::constants::{is_blank_line, is_comment_line, EOL_MARKER};
use crate::{Error, Location, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EofPhase {
    /// More lines may follow the current one.
    Open,
    /// The stream is exhausted; the current line is the last one.
    Draining,
    /// No current line remains.
    Exhausted,
}

/// Splits a byte stream into logical lines (LF, CR or CRLF terminated), hides
/// blank and comment lines, and offers one code point of look-ahead.
pub(crate) struct LineSource<R> {
    reader: R,
    raw: Vec<u8>,
    text: String,
    lookahead: char,
    byte_cursor: usize,
    char_cursor: usize,
    line_no: usize,
    phase: EofPhase,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            raw: Vec::new(),
            text: String::new(),
            lookahead: EOL_MARKER,
            byte_cursor: 0,
            char_cursor: 0,
            line_no: 0,
            phase: EofPhase::Open,
        }
    }

    /// Move to the next content line. Returns `false` once no lines remain.
    pub fn advance_line(&mut self) -> Result<bool> {
        self.byte_cursor = 0;
        self.char_cursor = 0;
        loop {
            if self.phase != EofPhase::Open {
                return Ok(self.finish());
            }
            self.line_no += 1;
            if !self.read_raw_line()? {
                return Ok(self.finish());
            }
            self.decode_raw_line()?;
            if self.stream_exhausted()? {
                self.phase = EofPhase::Draining;
            }
            if is_blank_line(&self.text) || is_comment_line(&self.text) {
                trace!(line = self.line_no, "skipping blank or comment line");
                continue;
            }
            trace!(line = self.line_no, text = %self.text, "read line");
            self.load_lookahead();
            return Ok(true);
        }
    }

    /// Move the look-ahead one code point forward. At the end of the line the
    /// look-ahead stays on the synthetic end-of-line marker.
    pub fn advance_cursor(&mut self) {
        if self.phase == EofPhase::Exhausted || self.at_end_of_line() {
            return;
        }
        self.byte_cursor += self.lookahead.len_utf8();
        self.char_cursor += 1;
        self.load_lookahead();
    }

    /// Current code point, `Some('\n')` at the end of a line, `None` at end of input.
    pub fn lookahead(&self) -> Option<char> {
        match self.phase {
            EofPhase::Exhausted => None,
            _ => Some(self.lookahead),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.phase == EofPhase::Exhausted
    }

    pub fn is_last_line(&self) -> bool {
        self.phase == EofPhase::Draining
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn column(&self) -> usize {
        self.char_cursor
    }

    pub fn location(&self) -> Location {
        Location::new(self.line_no, self.char_cursor)
    }

    /// Full text of the current line.
    pub fn line_text(&self) -> &str {
        &self.text
    }

    /// Text from the look-ahead to the end of the current line.
    pub fn remainder(&self) -> &str {
        if self.is_eof() {
            return "";
        }
        self.text.get(self.byte_cursor..).unwrap_or("")
    }

    fn at_end_of_line(&self) -> bool {
        self.byte_cursor >= self.text.len()
    }

    fn load_lookahead(&mut self) {
        self.lookahead = self.text[self.byte_cursor..]
            .chars()
            .next()
            .unwrap_or(EOL_MARKER);
    }

    fn finish(&mut self) -> bool {
        if self.phase != EofPhase::Exhausted {
            trace!(line = self.line_no, "end of input");
        }
        self.phase = EofPhase::Exhausted;
        self.text.clear();
        self.lookahead = EOL_MARKER;
        false
    }

    fn read_raw_line(&mut self) -> Result<bool> {
        self.raw.clear();
        let mut saw_bytes = false;
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.io_error("I/O error while reading input", err)),
            };
            if buf.is_empty() {
                return Ok(saw_bytes);
            }
            saw_bytes = true;
            match memchr2(b'\n', b'\r', buf) {
                Some(idx) => {
                    let terminator = buf[idx];
                    self.raw.extend_from_slice(&buf[..idx]);
                    self.reader.consume(idx + 1);
                    if terminator == b'\r' {
                        self.skip_linefeed()?;
                    }
                    return Ok(true);
                }
                None => {
                    let len = buf.len();
                    self.raw.extend_from_slice(buf);
                    self.reader.consume(len);
                }
            }
        }
    }

    fn skip_linefeed(&mut self) -> Result<()> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => {
                    if buf.first() == Some(&b'\n') {
                        self.reader.consume(1);
                    }
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.io_error("I/O error while reading input", err)),
            }
        }
    }

    fn stream_exhausted(&mut self) -> Result<bool> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.io_error("I/O error while reading input", err)),
            }
        }
    }

    fn decode_raw_line(&mut self) -> Result<()> {
        self.text.clear();
        match std::str::from_utf8(&self.raw) {
            Ok(text) => {
                self.text.push_str(text);
                Ok(())
            }
            Err(err) => Err(self.io_error(
                "input is not valid UTF-8",
                io::Error::new(io::ErrorKind::InvalidData, err),
            )),
        }
    }

    fn io_error(&self, message: &str, err: io::Error) -> Error {
        Error::io(message, err).with_location(Location::new(self.line_no, 0))
    }
}
