use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::memory::parse::ParseError;
use crate::memory::{Byte, Word};
use crate::processor::Instruction;

/// Errors that abort a running program
#[derive(Debug, Error)]
pub enum ExecError {
    /// The fetched opcode does not name any instruction
    #[error("unknown instruction 0b{opcode:08b} (0x{opcode:02X}) at address 0x{pc:02X}")]
    UnknownInstruction { opcode: Byte, pc: Word },
    /// The ALU was asked to run an instruction it does not implement
    #[error("unsupported ALU operation: {0}")]
    UnsupportedOperation(Instruction),
    #[error("memory has no address 0x{0:X}")]
    AddressOutOfRange(Word),
    #[error("register index {0} out of range")]
    RegisterOutOfRange(Byte),
    /// PUSH or CALL with the stack pointer already at address 0
    #[error("stack overflow")]
    StackOverflow,
    /// POP or RET on an empty stack
    #[error("stack underflow")]
    StackUnderflow,
    #[error("failed to write output")]
    Output(#[from] io::Error),
}

/// Errors that prevent a program from being loaded into memory
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: not found", .0.display())]
    ProgramFileNotFound(PathBuf),
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("program has {} invalid line(s)", .0.len())]
    Parse(Vec<ParseError>),
}
