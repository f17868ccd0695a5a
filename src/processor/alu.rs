use log::*;

use super::registers::{Flags, Registers};
use super::Instruction;
use crate::error::ExecError;
use crate::memory::Byte;

/// Runs an arithmetic or compare instruction on registers `a` and `b`.
///
/// ADD and MUL store into `a` and wrap modulo 256. CMP only touches the flags.
///
/// # Errors
///
/// [`ExecError::UnsupportedOperation`] for anything but ADD, MUL and CMP.
pub fn compute(
    operation: Instruction,
    a: Byte,
    b: Byte,
    registers: &mut Registers,
    flags: &mut Flags,
) -> Result<(), ExecError> {
    let lhs = registers.get(a)?;
    let rhs = registers.get(b)?;

    match operation {
        Instruction::ADD => {
            let result = lhs.wrapping_add(rhs);
            registers.set(a, result)?;

            debug!("ADD R{} R{}: {} + {} = {}", a, b, lhs, rhs, result);
        }
        Instruction::MUL => {
            let result = lhs.wrapping_mul(rhs);
            registers.set(a, result)?;

            debug!("MUL R{} R{}: {} * {} = {}", a, b, lhs, rhs, result);
        }
        Instruction::CMP => {
            flags.set_compare(lhs.cmp(&rhs));

            debug!("CMP R{} R{}: {} {}", a, b, lhs, flags);
        }
        other => return Err(ExecError::UnsupportedOperation(other)),
    }

    Ok(())
}
