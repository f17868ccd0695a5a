use std::cmp::Ordering;
use std::fmt;

use crate::error::ExecError;
use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Register holding the stack pointer
pub const SP: Byte = 7;

/// Value of the stack pointer when the stack is empty. The stack grows down
/// from here.
pub const STACK_START: Byte = 0xF4;

/// The register file R0-R7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    data: [Byte; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        let mut data = [0; REGISTER_COUNT];
        data[SP as usize] = STACK_START;
        Self { data }
    }
}

impl Registers {
    /// Reads register `index`
    pub fn get(&self, index: Byte) -> Result<Byte, ExecError> {
        self.data
            .get(index as usize)
            .copied()
            .ok_or(ExecError::RegisterOutOfRange(index))
    }

    /// Writes `value` to register `index`
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<(), ExecError> {
        let slot = self
            .data
            .get_mut(index as usize)
            .ok_or(ExecError::RegisterOutOfRange(index))?;
        *slot = value;
        Ok(())
    }

    pub fn sp(&self) -> Byte {
        self.data[SP as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.data[SP as usize] = value;
    }

    pub fn as_array(&self) -> &[Byte; REGISTER_COUNT] {
        &self.data
    }
}

/// Flags register, laid out as `00000LGE`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(Byte);

impl Flags {
    pub const LESS: Byte = 0b100;
    pub const GREATER: Byte = 0b010;
    pub const EQUAL: Byte = 0b001;

    /// Replaces all three condition bits with the outcome of a comparison
    pub fn set_compare(&mut self, ordering: Ordering) {
        self.0 = match ordering {
            Ordering::Less => Self::LESS,
            Ordering::Greater => Self::GREATER,
            Ordering::Equal => Self::EQUAL,
        };
    }

    pub fn equal(&self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn less(&self) -> bool {
        self.0 & Self::LESS != 0
    }

    pub fn greater(&self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn bits(&self) -> Byte {
        self.0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            bit(self.less(), 'L'),
            bit(self.greater(), 'G'),
            bit(self.equal(), 'E')
        )
    }
}
