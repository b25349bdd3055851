use std::fmt;
use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading the input or writing the output failed, or the input was not UTF-8.
    Io,
    /// An option was given a value outside its accepted set.
    Usage,
    /// A value cannot be represented as NestedText (or deserialized into the target type).
    Schema,
    NoInput,
    TopLevelIndent,
    IllegalTag,
    /// Any other violation of the document grammar.
    Format,
}

impl ErrorKind {
    pub fn is_format(self) -> bool {
        matches!(
            self,
            ErrorKind::NoInput
                | ErrorKind::TopLevelIndent
                | ErrorKind::IllegalTag
                | ErrorKind::Format
        )
    }
}

/// Position of the offending token: 1-based line, 0-based column in code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.line, self.column)
    }
}

#[derive(Debug, Error)]
#[error("{}{message}", location_prefix(.location))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
    #[source]
    source: Option<io::Error>,
}

fn location_prefix(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!("{location} "),
        None => String::new(),
    }
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            source: None,
        }
    }

    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(ErrorKind::Io, message)
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    pub fn format(kind: ErrorKind, message: impl Into<String>, location: Location) -> Self {
        debug_assert!(kind.is_format());
        Self {
            location: Some(location),
            ..Self::new(kind, message)
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_format(&self) -> bool {
        self.kind.is_format()
    }

    pub fn line(&self) -> Option<usize> {
        self.location.map(|location| location.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.location.map(|location| location.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[rstest::rstest]
    fn test_display_with_location() {
        let err = Error::format(
            ErrorKind::IllegalTag,
            "string tag ('>') followed by illegal character",
            Location::new(3, 2),
        );
        assert_eq!(
            err.to_string(),
            "[3,2] string tag ('>') followed by illegal character"
        );
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(2));
    }

    #[rstest::rstest]
    fn test_io_error_keeps_source() {
        let cause = io::Error::new(io::ErrorKind::UnexpectedEof, "pipe closed");
        let err =
            Error::io("I/O error while reading input", cause).with_location(Location::new(1, 0));
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(!err.is_format());
        assert_eq!(err.source().map(|s| s.to_string()), Some("pipe closed".to_string()));
    }

    #[rstest::rstest]
    #[case(ErrorKind::Io, false)]
    #[case(ErrorKind::Usage, false)]
    #[case(ErrorKind::Schema, false)]
    #[case(ErrorKind::NoInput, true)]
    #[case(ErrorKind::TopLevelIndent, true)]
    #[case(ErrorKind::IllegalTag, true)]
    #[case(ErrorKind::Format, true)]
    fn test_format_family(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_format(), expected);
    }
}
