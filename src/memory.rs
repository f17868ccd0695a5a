use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ExecError, LoadError};

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u16; // wide enough to name an address one past the end

/// Default memory, 256 bytes
pub type StdMem = Memory<0x100>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory with zeros
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Result<Byte, ExecError> {
        self.data
            .get(position as usize)
            .copied()
            .ok_or(ExecError::AddressOutOfRange(position))
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) -> Result<(), ExecError> {
        let cell = self
            .data
            .get_mut(position as usize)
            .ok_or(ExecError::AddressOutOfRange(position))?;
        *cell = value;
        Ok(())
    }

    /// Writes an array of bytes to the memory. Nothing is written if the array
    /// does not fit.
    pub fn write_array(&mut self, position: Word, data: &[Byte]) -> Result<(), ExecError> {
        let start = position as usize;
        let end = start + data.len();
        if end > S {
            let first_missing = start.max(S);
            return Err(ExecError::AddressOutOfRange(
                Word::try_from(first_missing).unwrap_or(Word::MAX),
            ));
        }

        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Copies a program image to the start of memory
    pub fn load_program(&mut self, program: &[Byte]) -> Result<(), ExecError> {
        self.write_array(0, program)
    }

    /// Reads and parses a program file.
    ///
    /// # Errors
    ///
    /// [`LoadError::ProgramFileNotFound`] if the file does not exist, otherwise
    /// [`LoadError::Io`] for read failures and [`LoadError::Parse`] with every
    /// bad line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::from_file_with_len(path).map(|(memory, _)| memory)
    }

    /// Like [`Memory::from_file`], but also returns the length of the
    /// program in bytes.
    pub fn from_file_with_len<P: AsRef<Path>>(path: P) -> Result<(Self, usize), LoadError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::ProgramFileNotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        log::debug!("Loading program from {}", path.display());
        Self::parse_with_len(&source)
    }

    /// Parses program source, returning the memory and the program length
    pub fn parse_with_len(source: &str) -> Result<(Self, usize), LoadError> {
        parse::Parser::new(source, Self::default())
            .parse()
            .map_err(LoadError::Parse)
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_len(s).map(|(memory, _)| memory)
    }
}

/// Writes a block of instructions directly into the memory
// Thanks for @Shemnei for helping me with this!
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ $(,)? ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}

#[cfg(test)]
mod tests {
    use crate::processor::Instruction;

    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_read_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.data[0x2] = 0x12;
        assert_eq!(mem.read_byte(0x2)?, 0x12);

        Ok(())
    }

    #[test]
    fn test_write_byte() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0x44, 12)?;
        assert_eq!(mem.data[0x44], 12);

        Ok(())
    }

    #[test]
    fn test_last_address() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_byte(0xFF, 7)?;
        assert_eq!(mem.read_byte(0xFF)?, 7);

        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let mut mem = StdMem::default();

        assert!(matches!(
            mem.read_byte(0x100),
            Err(ExecError::AddressOutOfRange(0x100))
        ));
        assert!(matches!(
            mem.write_byte(0x1FF, 1),
            Err(ExecError::AddressOutOfRange(0x1FF))
        ));
        assert_eq!(mem, StdMem::default());
    }

    #[test]
    fn test_write_array() -> Result<()> {
        let mut mem = StdMem::default();
        mem.write_array(0x44, &[0x12, 0x34, 0x56, 0x78])?;
        assert_eq!(mem.data[0x44], 0x12);
        assert_eq!(mem.data[0x45], 0x34);
        assert_eq!(mem.data[0x46], 0x56);
        assert_eq!(mem.data[0x47], 0x78);

        Ok(())
    }

    #[test]
    fn test_write_array_does_not_fit() {
        let mut mem = StdMem::default();

        assert!(matches!(
            mem.write_array(0xFE, &[1, 2, 3]),
            Err(ExecError::AddressOutOfRange(0x100))
        ));
        assert_eq!(mem, StdMem::default());
    }

    #[test]
    fn test_write_instructions() -> Result<()> {
        let mut mem = StdMem::default();

        mem.write_array(
            0x10,
            &[
                Instruction::LDI as Byte,
                0,
                42,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ],
        )?;

        let mut mem2 = StdMem::default();
        use crate::processor::Instruction::*;
        write_instructions!(mem2 : 0x10 => LDI, 0, 42, PRN, 0, HLT)?;

        assert_eq!(mem, mem2);

        Ok(())
    }

    #[test]
    fn test_from_file_not_found() {
        let result = StdMem::from_file("programs/does-not-exist.ls8");

        assert!(matches!(result, Err(LoadError::ProgramFileNotFound(_))));
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let mem = StdMem::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/programs/mult.ls8"))?;

        assert_eq!(mem.read_byte(0)?, Instruction::LDI.into());
        assert_eq!(mem.read_byte(1)?, 0);
        assert_eq!(mem.read_byte(2)?, 8);

        Ok(())
    }

    #[test]
    fn test_program_length_counts_trailing_zeros() -> Result<()> {
        let (mem, len) = StdMem::parse_with_len("01000111 # PRN R0\n00000000\n")?;

        assert_eq!(len, 2);
        assert_eq!(mem.read_byte(0)?, Instruction::PRN.into());

        Ok(())
    }
}
