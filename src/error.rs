//! Error types for etreemodel

use std::fmt;
use thiserror::Error;

/// Position in XML source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Range in XML source (or in an edit script, by line)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self::at(Pos::new(0, 0, 0))
    }

    /// Span covering a whole line of an edit script
    pub const fn line(line: u32) -> Self {
        Self::at(Pos::new(0, line, 1))
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedEof,
    InvalidToken,
    InvalidName,
    InvalidEntity { entity: String },
    InvalidUtf8,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { key: String },
    TrailingContent,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    NotAnElement,
    Inconsistent { detail: String },
    InvalidCommand { command: String },
    InvalidPath { path: String },
    Io { detail: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::InvalidName => write!(f, "invalid xml name"),
            Self::InvalidEntity { entity } => write!(f, "invalid entity: &{entity};"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { key } => write!(f, "duplicate attribute: {key}"),
            Self::TrailingContent => write!(f, "content after root element"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::NotAnElement => write!(f, "handle does not refer to a live element"),
            Self::Inconsistent { detail } => write!(f, "inconsistent tree: {detail}"),
            Self::InvalidCommand { command } => write!(f, "invalid command: {command}"),
            Self::InvalidPath { path } => write!(f, "no node at path: {path}"),
            Self::Io { detail } => write!(f, "io error: {detail}"),
        }
    }
}

/// Main error type for etreemodel
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Error that has no source location
    pub fn detached(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for etreemodel
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "10:5");
    }

    #[test]
    fn test_error_display_with_position() {
        let err = Error::at(ErrorKind::UnexpectedEof, Pos::new(10, 2, 5));
        let display = err.to_string();
        assert!(display.contains("error at 2:5"));
        assert!(display.contains("unexpected end of input"));
    }

    #[test]
    fn test_detached_error_has_no_position() {
        let err = Error::detached(ErrorKind::NotAnElement);
        assert_eq!(err.kind(), &ErrorKind::NotAnElement);
        assert!(!err.to_string().contains("error at"));
    }

    #[test]
    fn test_custom_message() {
        let err = Error::with_message(
            ErrorKind::InvalidCommand {
                command: "frob".to_string(),
            },
            Span::line(3),
            "unknown command `frob`",
        );
        assert_eq!(err.message(), "unknown command `frob`");
        assert_eq!(err.span().start.line, 3);
    }
}
