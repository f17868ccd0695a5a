//! Program file format, one byte per line written as a binary literal:
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

macro_rules! propagate {
    ( $res:expr ) => {
        match $res {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidNumber { radix: u32 },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse number with radix `{}`", radix)
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

/// Radix of every byte literal in a program file
const RADIX: u32 = 2;

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

    /// Consumes `self` and tries to parse all of the data into memory.
    /// Returns the memory and the number of bytes loaded.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<(Memory<S>, usize), Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} byte(s)", self.position);
            Ok((self.memory, self.position))
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Everything from `#` to the end of the
    /// line is a comment; lines left empty are skipped.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let line = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        }
        .trim();

        if line.is_empty() {
            return Some(Ok(()));
        }

        let byte = propagate!(Byte::from_str_radix(line, RADIX).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidNumber { radix: RADIX },
                format!("`{}` is not a byte", line),
                self.line_nr,
            )
        }));

        Some(self.write_byte(byte))
    }

    /// Writes `byte` at the current position, then moves to the next address.
    ///
    /// # Errors
    ///
    /// Fails once the program runs past the end of memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        let cell = self.memory.data.get_mut(self.position).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidAddress {
                    address: self.position,
                },
                "program does not fit into memory",
                self.line_nr,
            )
        })?;

        *cell = byte;
        self.position += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::LoadError;
    use crate::memory::StdMem;
    use crate::processor::Instruction;
    use std::str::FromStr;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_mult() -> Result<()> {
        let data = r#"
            # mult.ls8
            10000010 # LDI R0,8
            00000000
            00001000
            10000010 # LDI R1,9
            00000001
            00001001
            10100010 # MUL R0,R1
            00000000
            00000001
            01000111 # PRN R0
            00000000
            00000001 # HLT
        "#;

        let mem = StdMem::from_str(data)?;

        assert_eq!(mem.read_byte(0)?, Instruction::LDI.into());
        assert_eq!(mem.read_byte(2)?, 8);
        assert_eq!(mem.read_byte(5)?, 9);
        assert_eq!(mem.read_byte(6)?, Instruction::MUL.into());
        assert_eq!(mem.read_byte(9)?, Instruction::PRN.into());
        assert_eq!(mem.read_byte(11)?, Instruction::HLT.into());
        assert_eq!(mem.read_byte(12)?, 0);

        Ok(())
    }

    #[test]
    fn parse_skips_comment_only_lines() -> Result<()> {
        let data = "#10000010\n\n   # nothing here\n00000001#HLT\n";

        let mem = StdMem::from_str(data)?;

        assert_eq!(mem.read_byte(0)?, Instruction::HLT.into());
        assert_eq!(mem.read_byte(1)?, 0);

        Ok(())
    }

    #[test]
    fn parse_short_literal() -> Result<()> {
        let mem = StdMem::from_str("101\n")?;

        assert_eq!(mem.read_byte(0)?, 5);

        Ok(())
    }

    #[test]
    fn parse_collects_every_bad_line() {
        let data = "00000001\n0000002\nhello # world\n111111111\n";

        let errors = match StdMem::from_str(data) {
            Err(LoadError::Parse(errors)) => errors,
            other => panic!("expected parse errors, got {:?}", other),
        };

        let lines: Vec<_> = errors.iter().map(ParseError::line_nr).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(errors
            .iter()
            .all(|err| err.kind() == ParseErrorKind::InvalidNumber { radix: 2 }));
    }

    #[test]
    fn parse_program_too_large() {
        let data = "00000000\n".repeat(257);

        let errors = match StdMem::from_str(&data) {
            Err(LoadError::Parse(errors)) => errors,
            other => panic!("expected parse errors, got {:?}", other),
        };

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind(),
            ParseErrorKind::InvalidAddress { address: 256 }
        );
        assert_eq!(errors[0].line_nr(), 257);
    }
}
