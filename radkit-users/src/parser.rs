//
// Copyright (c) The Radkit Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fs;
use std::path::{Path, PathBuf};

use radkit_proto::dictionary::Dictionary;
use tracing::debug;

use crate::entry::{AttrMap, MapOp, RhsValue, UsersEntry};
use crate::error::{ParseError, ParseErrorKind, ParseResult};

// Maximum $INCLUDE nesting depth, to bound runaway inclusion chains.
const MAX_INCLUDE_DEPTH: usize = 16;

// Operator tokens, longest first so that "==" wins over "=".
const OP_TOKENS: &[&str] = &[
    "==", "!=", "<=", ">=", "=~", "!~", ":=", "+=", "<", ">", "=",
];

// Reads a users file, resolving $INCLUDE directives relative to it.
pub fn load(
    dict: &Dictionary,
    path: impl AsRef<Path>,
) -> ParseResult<Vec<UsersEntry>> {
    let mut parser = Parser {
        dict,
        order: 0,
        depth: 0,
    };
    parser.parse_file(path.as_ref())
}

// Parses users-file text directly. $INCLUDE directives resolve relative
// to the given file name.
pub fn parse_str(
    dict: &Dictionary,
    file: impl AsRef<Path>,
    input: &str,
) -> ParseResult<Vec<UsersEntry>> {
    let mut parser = Parser {
        dict,
        order: 0,
        depth: 0,
    };
    parser.parse_source(file.as_ref(), input)
}

struct Parser<'a> {
    dict: &'a Dictionary,
    // Entry counter, continuing across $INCLUDE boundaries.
    order: u32,
    depth: usize,
}

// ===== impl Parser =====

impl Parser<'_> {
    fn parse_file(&mut self, path: &Path) -> ParseResult<Vec<UsersEntry>> {
        let input = fs::read_to_string(path).map_err(|error| ParseError {
            file: path.to_path_buf(),
            line: 0,
            kind: ParseErrorKind::Io(error),
        })?;
        self.parse_source(path, &input)
    }

    fn parse_source(
        &mut self,
        file: &Path,
        input: &str,
    ) -> ParseResult<Vec<UsersEntry>> {
        debug!(file = %file.display(), "reading users file");
        let mut entries = vec![];
        let mut scanner = Scanner::new(file, input);

        'entry: loop {
            // Lines that are blank or hold only a comment are skipped
            // regardless of indentation.
            let leading_spaces = scanner.skip_spaces() > 0;
            if scanner.eat(b'#') {
                scanner.skip_comment();
            }
            if scanner.eat_newline() {
                continue;
            }
            if scanner.at_eof() {
                break;
            }

            // Whatever follows is a name, and names MUST start at the
            // beginning of the line.
            if leading_spaces {
                return Err(
                    scanner.error(ParseErrorKind::EntryNotAtLineStart)
                );
            }

            if scanner.starts_with("$INCLUDE") {
                scanner.advance("$INCLUDE".len());
                self.include(&mut scanner, file, &mut entries)?;
                continue;
            }

            let name = scanner.read_name().to_owned();
            if name.is_empty() {
                break;
            }
            let mut entry = UsersEntry {
                name,
                line: scanner.line,
                order: self.next_order(),
                check: vec![],
                reply: vec![],
            };

            // Check items, on the same line as the name.
            let mut comma = false;
            loop {
                scanner.skip_spaces();
                if scanner.peek() == Some(b'#') {
                    scanner.skip_comment();
                }
                if scanner.eat_newline() {
                    if comma {
                        return Err(
                            scanner.error(ParseErrorKind::TrailingComma)
                        );
                    }
                    break;
                }
                if scanner.at_eof() {
                    entries.push(entry);
                    break 'entry;
                }

                match self.parse_map(&mut scanner, true)? {
                    None => {
                        // Nothing was read, and spaces, comments and
                        // newlines are already handled. A comma here is
                        // stray; anything else means the input ended.
                        if scanner.peek() == Some(b',') {
                            return Err(
                                scanner.error(ParseErrorKind::ExtraComma)
                            );
                        }
                        entries.push(entry);
                        break 'entry;
                    }
                    Some(map) => {
                        entry.check.push(map);
                        scanner.skip_spaces();
                        if scanner.eat(b',') {
                            comma = true;
                            continue;
                        }
                        comma = false;
                        if scanner.eat(b'#') {
                            scanner.skip_comment();
                        }
                        if scanner.eat_newline() {
                            break;
                        }
                        if scanner.at_eof() {
                            entries.push(entry);
                            break 'entry;
                        }
                        return Err(
                            scanner.error(ParseErrorKind::UnexpectedText)
                        );
                    }
                }
            }

            // Reply items, on the following indented lines.
            let mut comma = false;
            'reply: loop {
                // An unindented line (or EOF) ends the entry; it is
                // reexamined as the start of the next one.
                if scanner.skip_spaces() == 0 {
                    if comma {
                        return Err(
                            scanner.error(ParseErrorKind::TrailingComma)
                        );
                    }
                    entries.push(entry);
                    continue 'entry;
                }

                if scanner.line == entry.line + 1 {
                    // The first reply line needs no continuation comma.
                } else if !comma {
                    return Err(scanner.error(ParseErrorKind::MissingComma));
                }

                // Items on this line.
                loop {
                    if scanner.at_eof() {
                        entries.push(entry);
                        break 'entry;
                    }
                    match self.parse_map(&mut scanner, false)? {
                        None => {
                            scanner.skip_spaces();
                            if scanner.peek() == Some(b',') {
                                return Err(scanner
                                    .error(ParseErrorKind::ExtraComma));
                            }
                            if scanner.eat(b'#') {
                                scanner.skip_comment();
                            }
                            if scanner.eat_newline() {
                                continue 'reply;
                            }
                            entries.push(entry);
                            break 'entry;
                        }
                        Some(map) => {
                            entry.reply.push(map);
                            scanner.skip_spaces();
                            if scanner.eat(b',') {
                                comma = true;
                                scanner.skip_spaces();
                            } else {
                                comma = false;
                            }
                            if scanner.eat(b'#') {
                                scanner.skip_comment();
                            }
                            if scanner.eat_newline() {
                                continue 'reply;
                            }
                            if scanner.at_eof() {
                                entries.push(entry);
                                break 'entry;
                            }
                            if comma {
                                // Another item on the same line.
                                continue;
                            }
                            return Err(scanner
                                .error(ParseErrorKind::UnexpectedText));
                        }
                    }
                }
            }
        }

        Ok(entries)
    }

    // Handles a $INCLUDE directive: the scanner sits right after the
    // keyword.
    fn include(
        &mut self,
        scanner: &mut Scanner<'_>,
        file: &Path,
        entries: &mut Vec<UsersEntry>,
    ) -> ParseResult<()> {
        if scanner.skip_spaces() == 0 {
            return Err(
                scanner.error(ParseErrorKind::UnexpectedTextAfterInclude)
            );
        }

        let name = scanner.read_name();
        if name.is_empty() {
            return Err(
                scanner.error(ParseErrorKind::MissingIncludeFilename)
            );
        }

        // Relative names resolve against the including file's directory.
        let path = if Path::new(name).is_absolute() {
            PathBuf::from(name)
        } else {
            match file.parent() {
                Some(dir) if dir != Path::new("") => dir.join(name),
                _ => PathBuf::from(name),
            }
        };

        // Only spaces and comments may follow the filename.
        scanner.skip_spaces();
        if scanner.eat(b'#') {
            scanner.skip_comment();
        }
        if !scanner.at_eof() && scanner.peek() != Some(b'\n') {
            return Err(scanner.error(ParseErrorKind::UnexpectedText));
        }

        if self.depth == MAX_INCLUDE_DEPTH {
            return Err(scanner.error(ParseErrorKind::IncludeDepthExceeded));
        }

        let input = fs::read_to_string(&path)
            .map_err(|error| scanner.error(ParseErrorKind::Io(error)))?;
        self.depth += 1;
        let mut included = self.parse_source(&path, &input)?;
        self.depth -= 1;
        entries.append(&mut included);

        scanner.eat_newline();
        Ok(())
    }

    // Parses one "attribute op value" item, or nothing if the scanner
    // sits on a terminal character.
    fn parse_map(
        &self,
        scanner: &mut Scanner<'_>,
        check: bool,
    ) -> ParseResult<Option<AttrMap>> {
        if matches!(scanner.peek(), None | Some(b'#') | Some(b'\n') | Some(b','))
        {
            return Ok(None);
        }

        let name = scanner.read_attr_name();
        if name.is_empty() {
            return Err(scanner.error(ParseErrorKind::UnexpectedText));
        }
        let attr = self.dict.attr_by_name(name).ok_or_else(|| {
            scanner
                .error(ParseErrorKind::UnknownAttribute(name.to_owned()))
        })?;

        scanner.skip_spaces();
        let token = scanner.read_operator().ok_or_else(|| {
            scanner.error(ParseErrorKind::InvalidOperator(
                scanner.rest_of_line().to_owned(),
            ))
        })?;
        let op = MapOp::from_token(token).ok_or_else(|| {
            scanner.error(ParseErrorKind::InvalidOperator(token.to_owned()))
        })?;
        let allowed = if check { op.is_check_op() } else { op.is_reply_op() };
        if !allowed {
            return Err(scanner
                .error(ParseErrorKind::InvalidOperator(token.to_owned())));
        }

        scanner.skip_spaces();
        let value = scanner.read_rhs()?;

        // A bareword naming another attribute is almost certainly a
        // mistake, and rule matching would never resolve it.
        if let RhsValue::Bareword(word) = &value
            && self.dict.attr_by_name(word).is_some()
        {
            return Err(scanner
                .error(ParseErrorKind::AttributeValue(word.to_owned())));
        }

        Ok(Some(AttrMap { attr, op, value }))
    }

    fn next_order(&mut self) -> u32 {
        let order = self.order;
        self.order += 1;
        order
    }
}

// Character-level scanner with line tracking.
struct Scanner<'a> {
    file: &'a Path,
    input: &'a [u8],
    pos: usize,
    line: u32,
}

// ===== impl Scanner =====

impl<'a> Scanner<'a> {
    fn new(file: &'a Path, input: &'a str) -> Scanner<'a> {
        Scanner {
            file,
            input: input.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            file: self.file.to_path_buf(),
            line: self.line,
            kind,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_newline(&mut self) -> bool {
        if self.eat(b'\n') {
            self.line += 1;
            true
        } else {
            false
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix.as_bytes())
    }

    // Skips spaces and tabs (but never newlines), returning how many
    // characters were skipped.
    fn skip_spaces(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | 0x0b | 0x0c)) {
            self.pos += 1;
        }
        self.pos - start
    }

    // Skips a comment up to (but not including) the end of the line.
    fn skip_comment(&mut self) {
        while !matches!(self.peek(), None | Some(b'\n')) {
            self.pos += 1;
        }
    }

    // Reads a subject or file name: anything up to a space, tab,
    // newline or comment.
    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        while !matches!(
            self.peek(),
            None | Some(b' ' | b'\t' | b'\n' | b'#')
        ) {
            self.pos += 1;
        }
        // Delimiters are ASCII, so the boundaries are valid.
        std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("")
    }

    // Reads an attribute name.
    fn read_attr_name(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(byte)
                if byte.is_ascii_alphanumeric()
                    || matches!(byte, b'-' | b'_' | b'.' | b'/')
        ) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("")
    }

    // Reads a comparison or assignment operator token.
    fn read_operator(&mut self) -> Option<&'static str> {
        let token = OP_TOKENS
            .iter()
            .find(|token| self.starts_with(token))
            .copied()?;
        self.advance(token.len());
        Some(token)
    }

    // Remaining input on the current line, for error context.
    fn rest_of_line(&self) -> &'a str {
        let rest = &self.input[self.pos..];
        let end = rest
            .iter()
            .position(|byte| *byte == b'\n')
            .unwrap_or(rest.len());
        std::str::from_utf8(&rest[..end]).unwrap_or("")
    }

    // Reads a right-hand-side value: a double-quoted string with
    // backslash escapes, or a bareword where whitespace can be escaped.
    fn read_rhs(&mut self) -> ParseResult<RhsValue> {
        if self.eat(b'"') {
            return self.read_quoted();
        }

        let mut value = Vec::new();
        loop {
            match self.peek() {
                None | Some(b' ' | b'\t' | b'\n' | b'#' | b',') => break,
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(byte @ (b' ' | b'\t' | b'\n' | b'\\')) => {
                            value.push(byte);
                            self.pos += 1;
                        }
                        Some(b'x') => {
                            self.pos += 1;
                            value.push(self.read_hex_escape()?);
                        }
                        Some(byte) => {
                            value.push(b'\\');
                            value.push(byte);
                            self.pos += 1;
                        }
                        None => value.push(b'\\'),
                    }
                }
                Some(byte) => {
                    value.push(byte);
                    self.pos += 1;
                }
            }
        }
        if value.is_empty() {
            return Err(self.error(ParseErrorKind::MissingValue));
        }
        Ok(RhsValue::Bareword(
            String::from_utf8_lossy(&value).into_owned(),
        ))
    }

    fn read_quoted(&mut self) -> ParseResult<RhsValue> {
        let mut value = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(
                        self.error(ParseErrorKind::UnterminatedString)
                    );
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b't') => {
                            value.push(b'\t');
                            self.pos += 1;
                        }
                        Some(b'n') => {
                            value.push(b'\n');
                            self.pos += 1;
                        }
                        Some(byte @ (b'\\' | b'"')) => {
                            value.push(byte);
                            self.pos += 1;
                        }
                        Some(b'x') => {
                            self.pos += 1;
                            value.push(self.read_hex_escape()?);
                        }
                        Some(byte) => {
                            value.push(b'\\');
                            value.push(byte);
                            self.pos += 1;
                        }
                        None => {
                            return Err(self
                                .error(ParseErrorKind::UnterminatedString));
                        }
                    }
                }
                Some(byte) => {
                    value.push(byte);
                    self.pos += 1;
                }
            }
        }
        Ok(RhsValue::Quoted(
            String::from_utf8_lossy(&value).into_owned(),
        ))
    }

    // Reads the two hex digits of a \xHH escape.
    fn read_hex_escape(&mut self) -> ParseResult<u8> {
        let mut byte = 0;
        for _ in 0..2 {
            let digit = self
                .peek()
                .and_then(|byte| char::from(byte).to_digit(16))
                .ok_or_else(|| {
                    self.error(ParseErrorKind::InvalidEscape)
                })?;
            byte = byte * 16 + digit as u8;
            self.pos += 1;
        }
        Ok(byte)
    }
}
