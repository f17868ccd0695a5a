use std::io;

use color_eyre::eyre::Result;

use log::LevelFilter;
use ls8::memory::StdMem;
use ls8::processor::Processor;
use ls8::write_instructions;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()?; // logging

    let mut mem = StdMem::default();

    // Counts down from 10 to 1. Adding 255 subtracts one since registers wrap.
    use ls8::processor::Instruction::*;
    write_instructions!(mem : 0x00 =>
        LDI, 0, 10,   // 00: counter
        LDI, 1, 255,  // 03: -1
        LDI, 2, 0,    // 06: zero
        LDI, 3, 0x0C, // 09: loop address
        PRN, 0,       // 0C: loop
        ADD, 0, 1,    // 0E
        CMP, 0, 2,    // 11
        JNE, 3,       // 14
        HLT           // 16
    )?;

    let mut cpu = Processor::new(mem);
    cpu.run(&mut io::stdout())?;

    Ok(())
}
