use std::io::Write;

use crate::error::ExecError;
use crate::memory::{Byte, StdMem, Word};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

pub mod alu;
pub mod registers;

use registers::{Flags, Registers, STACK_START};

/// Number of operand bytes following `opcode`, taken from its top two bits
pub const fn operand_count(opcode: Byte) -> u8 {
    opcode >> 6
}

/// Number of bytes an instruction occupies, opcode included
pub const fn instruction_length(opcode: Byte) -> Word {
    operand_count(opcode) as Word + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    Halted,
}

/// What the execution loop does with the program counter after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Move past the instruction and its operands
    Next,
    /// The instruction chose the next address itself
    Jump(Word),
}

/// Emulates a CPU
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: Word,
    /// General purpose registers, R7 is the stack pointer
    pub registers: Registers,
    /// Set by CMP, read by JEQ and JNE
    pub flags: Flags,
    pub memory: StdMem,
    pub state: State,
}

impl Default for Processor {
    /// Initializes a new CPU with empty memory
    fn default() -> Self {
        Self::new(StdMem::default())
    }
}

impl Processor {
    /// Initializes a new CPU owning `memory`, with the first instruction at
    /// address 0
    pub fn new(memory: StdMem) -> Self {
        Self {
            pc: 0,
            registers: Registers::default(),
            flags: Flags::default(),
            memory,
            state: State::Running,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Runs one fetch-decode-execute cycle. PRN output goes to `out`. Does
    /// nothing once the processor has halted.
    ///
    /// # Errors
    ///
    /// Any error is fatal: the processor is halted and the program counter
    /// is left on the failing instruction.
    pub fn execute<W: Write>(&mut self, out: &mut W) -> Result<(), ExecError> {
        if self.is_halted() {
            return Ok(());
        }

        let result = self.cycle(out);
        if let Err(err) = &result {
            error!("Halting at 0x{:02X}: {}", self.pc, err);
            self.state = State::Halted;
        }
        result
    }

    /// Run program until it halts. Returns the number of executed
    /// instructions.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<usize, ExecError> {
        self.state = State::Running;
        let mut cycles = 0;

        while !self.is_halted() {
            self.execute(out)?;
            cycles += 1;
        }
        out.flush()?;

        info!("Program halted after {} instruction(s)", cycles);

        Ok(cycles)
    }

    fn cycle<W: Write>(&mut self, out: &mut W) -> Result<(), ExecError> {
        let opcode = self.memory.read_byte(self.pc)?; // Read opcode where PC is
        let instruction =
            Instruction::try_from(opcode).map_err(|_| ExecError::UnknownInstruction {
                opcode,
                pc: self.pc,
            })?;

        let mut operands = [0; 2];
        let count = instruction.operand_count() as usize;
        for (i, operand) in operands.iter_mut().take(count).enumerate() {
            *operand = self.memory.read_byte(self.pc + 1 + i as Word)?;
        }

        trace!("{}", self.trace());

        match self.execute_instruction(instruction, operands, out)? {
            Flow::Next => self.pc += instruction.length(),
            Flow::Jump(address) => self.pc = address,
        }

        Ok(())
    }

    /// Executes a single decoded instruction
    fn execute_instruction<W: Write>(
        &mut self,
        instruction: Instruction,
        [a, b]: [Byte; 2],
        out: &mut W,
    ) -> Result<Flow, ExecError> {
        match instruction {
            Instruction::HLT => {
                self.state = State::Halted;

                debug!("HLT");
            }
            Instruction::LDI => {
                self.registers.set(a, b)?;

                debug!("LDI R{} {}", a, b);
            }
            Instruction::PRN => {
                let value = self.registers.get(a)?;
                writeln!(out, "{}", value)?;

                debug!("PRN R{}: {}", a, value);
            }
            Instruction::ADD | Instruction::MUL | Instruction::CMP => {
                alu::compute(instruction, a, b, &mut self.registers, &mut self.flags)?;
            }
            Instruction::PUSH => {
                let value = self.registers.get(a)?;
                self.push(value)?;

                debug!("PUSH R{}: {}", a, value);
            }
            Instruction::POP => {
                let value = self.pop()?;
                self.registers.set(a, value)?;

                debug!("POP R{}: {}", a, value);
            }
            Instruction::CALL => {
                let target = self.registers.get(a)?;
                let next = self.pc + instruction.length();
                let ret = Byte::try_from(next).map_err(|_| ExecError::AddressOutOfRange(next))?;
                self.push(ret)?;

                debug!("CALL R{}: {} (return to {})", a, target, ret);
                return Ok(Flow::Jump(target.into()));
            }
            Instruction::RET => {
                let target = self.pop()?;

                debug!("RET {}", target);
                return Ok(Flow::Jump(target.into()));
            }
            Instruction::JMP => {
                let target = self.registers.get(a)?;

                debug!("JMP R{}: {}", a, target);
                return Ok(Flow::Jump(target.into()));
            }
            Instruction::JEQ | Instruction::JNE => {
                let target = self.registers.get(a)?;
                let taken = self.flags.equal() == (instruction == Instruction::JEQ);

                debug!("{} R{}: {} taken={}", instruction, a, target, taken);
                if taken {
                    return Ok(Flow::Jump(target.into()));
                }
            }
        }

        Ok(Flow::Next)
    }

    /// Pushes `value` onto the stack.
    ///
    /// # Errors
    ///
    /// [`ExecError::StackOverflow`] when the stack pointer is already at 0.
    pub fn push(&mut self, value: Byte) -> Result<(), ExecError> {
        let sp = self
            .registers
            .sp()
            .checked_sub(1)
            .ok_or(ExecError::StackOverflow)?;

        self.memory.write_byte(sp.into(), value)?;
        self.registers.set_sp(sp);
        Ok(())
    }

    /// Pops the most recently pushed byte.
    ///
    /// # Errors
    ///
    /// [`ExecError::StackUnderflow`] when the stack pointer is at or above its
    /// starting address.
    pub fn pop(&mut self) -> Result<Byte, ExecError> {
        let sp = self.registers.sp();
        if sp >= STACK_START {
            return Err(ExecError::StackUnderflow);
        }

        let value = self.memory.read_byte(sp.into())?;
        self.registers.set_sp(sp + 1);
        Ok(value)
    }

    /// Renders the processor state as `TRACE: PC | IR OP1 OP2 | FL | R0 .. R7`.
    /// Bytes past the end of memory show as `--`.
    pub fn trace(&self) -> String {
        let peek = |offset: Word| match self.memory.read_byte(self.pc.saturating_add(offset)) {
            Ok(byte) => format!("{:02X}", byte),
            Err(_) => "--".to_owned(),
        };

        let mut line = format!(
            "TRACE: {:02X} | {} {} {} | {} |",
            self.pc,
            peek(0),
            peek(1),
            peek(2),
            self.flags
        );
        for value in self.registers.as_array() {
            line.push_str(&format!(" {:02X}", value));
        }

        line
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instructions. An opcode is laid out as `AABCDDDD`
        /// where `AA` is the number of operands.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for Instruction {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001,
    /// Return from a subroutine to the address on top of the stack
    RET = 0b0001_0001,
    /// Push a register onto the stack
    /// @param reg The register to push
    PUSH = 0b0100_0101,
    /// Pop the top of the stack into a register
    /// @param reg The destination register
    POP = 0b0100_0110,
    /// Print a register as a decimal number followed by a newline
    /// @param reg The register to print
    PRN = 0b0100_0111,
    /// Push the return address and jump to the address in a register
    /// @param reg Register holding the subroutine address
    CALL = 0b0101_0000,
    /// Jump to the address in a register
    /// @param reg Register holding the target
    JMP = 0b0101_0100,
    /// Jump if the last compare was equal
    /// @param reg Register holding the target
    JEQ = 0b0101_0101,
    /// Jump if the last compare was not equal
    /// @param reg Register holding the target
    JNE = 0b0101_0110,
    /// Load an immediate value into a register
    /// @param reg The destination register
    /// @param value The value to load
    LDI = 0b1000_0010,
    /// Add two registers, storing into the first
    ADD = 0b1010_0000,
    /// Multiply two registers, storing into the first
    MUL = 0b1010_0010,
    /// Compare two registers and set the flags
    CMP = 0b1010_0111,
}

impl Instruction {
    pub fn operand_count(self) -> u8 {
        operand_count(self.into())
    }

    /// Length in bytes, opcode included
    pub fn length(self) -> Word {
        instruction_length(self.into())
    }
}
