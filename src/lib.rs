//! Emulator for the LS-8, an 8-bit computer with 256 bytes of memory, eight
//! registers and a handful of instructions.

pub mod disassembler;
pub mod error;
pub mod memory;
pub mod processor;
