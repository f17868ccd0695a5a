use std::io;

use color_eyre::eyre::Result;

use ls8::memory::StdMem;
use ls8::processor::Processor;
use ls8::write_instructions;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init()?; // logging

    let mut mem = StdMem::default();

    use ls8::processor::Instruction::*;
    write_instructions!(mem : 0x00 =>
        LDI, 0, 8,
        LDI, 1, 9,
        MUL, 0, 1,
        PRN, 0,
        HLT
    )?;

    let mut cpu = Processor::new(mem);
    cpu.run(&mut io::stdout())?;

    Ok(())
}
