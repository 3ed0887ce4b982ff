//! Loader for LS-8 program images.
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use super::{Byte, Memory};

/// Number of binary digits which encode one byte.
const DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidInstruction,
    ProgramTooLarge { capacity: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidInstruction => f.write_str("invalid instruction byte"),
            ParseErrorKind::ProgramTooLarge { capacity } => {
                write!(f, "program does not fit into {} bytes of memory", capacity)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: usize,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` starting
    /// at address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all `self.data` into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.position);
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Each instruction byte should be located
    /// on its own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?.trim();
        self.line_nr += 1;

        if line.is_empty() || line.starts_with('#') {
            // Comment or empty line; skip
            Some(Ok(()))
        } else {
            Some(self.parse_byte(line))
        }
    }

    /// Parses the leading eight binary digits of `line`. Anything after them
    /// is ignored.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `01000111 # PRN R0`
    fn parse_byte(&mut self, line: &str) -> Result<()> {
        let digits = line
            .get(..DIGITS)
            .filter(|digits| digits.bytes().all(|b| b == b'0' || b == b'1'))
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidInstruction,
                    format!("expected {} binary digits, found `{}`", DIGITS, line),
                    self.line_nr,
                )
            })?;

        let byte = Byte::from_str_radix(digits, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidInstruction,
                format!("`{}` is not a binary number", digits),
                self.line_nr,
            )
        })?;

        self.write_byte(byte)
    }

    /// Writes `byte` into memory at [self.position](`Parser::position`), then
    /// moves the position forward by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the program does not fit into memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        self.memory
            .write_byte(self.position, byte)
            .map_err(|fault| {
                ParseError::new(
                    ParseErrorKind::ProgramTooLarge { capacity: S },
                    fault.to_string(),
                    self.line_nr,
                )
            })?;
        self.position += 1;
        Ok(())
    }
}
