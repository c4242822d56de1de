//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;

// Type aliases.
pub type ParseResult<T> = Result<T, ParseError>;

// Users-file parsing error, with the file and line it happened on.
#[derive(Debug)]
pub struct ParseError {
    pub file: PathBuf,
    pub line: u32,
    pub kind: ParseErrorKind,
}

#[derive(Debug)]
pub enum ParseErrorKind {
    Io(std::io::Error),
    EntryNotAtLineStart,
    UnexpectedTextAfterInclude,
    MissingIncludeFilename,
    IncludeDepthExceeded,
    UnterminatedString,
    InvalidEscape,
    UnknownAttribute(String),
    InvalidOperator(String),
    AttributeValue(String),
    MissingValue,
    ExtraComma,
    TrailingComma,
    MissingComma,
    UnexpectedText,
}

// ===== impl ParseError =====

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.file.display(), self.line, self.kind)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Io(error) => Some(error),
            _ => None,
        }
    }
}

// ===== impl ParseErrorKind =====

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::Io(error) => {
                write!(f, "{error}")
            }
            ParseErrorKind::EntryNotAtLineStart => {
                write!(f, "entry does not begin with a user name")
            }
            ParseErrorKind::UnexpectedTextAfterInclude => {
                write!(f, "unexpected text after $INCLUDE")
            }
            ParseErrorKind::MissingIncludeFilename => {
                write!(f, "no filename after $INCLUDE")
            }
            ParseErrorKind::IncludeDepthExceeded => {
                write!(f, "maximum $INCLUDE depth exceeded")
            }
            ParseErrorKind::UnterminatedString => {
                write!(f, "unterminated string")
            }
            ParseErrorKind::InvalidEscape => {
                write!(f, "invalid escape sequence")
            }
            ParseErrorKind::UnknownAttribute(name) => {
                write!(f, "unknown attribute '{name}'")
            }
            ParseErrorKind::InvalidOperator(token) => {
                write!(f, "invalid operator '{token}'")
            }
            ParseErrorKind::AttributeValue(name) => {
                write!(f, "value '{name}' resolves to an attribute")
            }
            ParseErrorKind::MissingValue => {
                write!(f, "missing value after operator")
            }
            ParseErrorKind::ExtraComma => {
                write!(f, "unexpected extra comma")
            }
            ParseErrorKind::TrailingComma => {
                write!(f, "invalid comma ending the item list")
            }
            ParseErrorKind::MissingComma => {
                write!(f, "missing comma in previous line")
            }
            ParseErrorKind::UnexpectedText => {
                write!(f, "unexpected text after item")
            }
        }
    }
}
