//! Turns memory back into a readable listing

use std::fmt;

use crate::memory::{Byte, Memory, Word};
use crate::processor::{instruction_length, Instruction};

/// One decoded instruction, or a byte that does not start one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub address: Word,
    pub bytes: Vec<Byte>,
    pub instruction: Option<Instruction>,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:", self.address)?;

        let instruction = match self.instruction {
            Some(instruction) => instruction,
            None => return write!(f, " .byte 0b{:08b}", self.bytes[0]),
        };

        write!(f, " {}", instruction)?;
        match (instruction, &self.bytes[1..]) {
            (Instruction::LDI, [reg, value]) => write!(f, " R{},{}", reg, value),
            (_, [a, b]) => write!(f, " R{},R{}", a, b),
            (_, [a]) => write!(f, " R{}", a),
            _ => Ok(()),
        }
    }
}

/// Decodes memory from address 0 up to `end`. Instructions whose operands
/// would run past `end` are listed byte by byte as data.
pub fn disassemble<const S: usize>(memory: &Memory<S>, end: usize) -> Vec<Line> {
    let end = end.min(S);
    let mut lines = Vec::new();
    let mut address = 0;

    while address < end {
        let opcode = memory.data[address];
        let length = instruction_length(opcode) as usize;

        let line = match Instruction::try_from(opcode) {
            Ok(instruction) if address + length <= end => Line {
                address: address as Word,
                bytes: memory.data[address..address + length].to_vec(),
                instruction: Some(instruction),
            },
            _ => Line {
                address: address as Word,
                bytes: vec![opcode],
                instruction: None,
            },
        };

        address += line.bytes.len();
        lines.push(line);
    }

    lines
}
