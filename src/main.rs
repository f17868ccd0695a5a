use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::disassembler::disassemble;
use ls8::memory::StdMem;
use ls8::processor::Processor;

/// Run an LS-8 program
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Program file, one binary byte per line
    program: PathBuf,

    /// Log the processor state before every instruction
    #[arg(short, long)]
    trace: bool,

    /// Print a listing of the program instead of running it
    #[arg(short, long)]
    disassemble: bool,

    /// More log output, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn level(&self) -> LevelFilter {
        if self.trace {
            return LevelFilter::Trace;
        }

        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let args = Args::parse();

    SimpleLogger::new()
        .with_level(args.level())
        .init()
        .wrap_err("failed to set up logging")?;

    let (memory, len) = StdMem::from_file_with_len(&args.program)
        .wrap_err_with(|| format!("failed to load {}", args.program.display()))?;

    if args.disassemble {
        for line in disassemble(&memory, len) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut cpu = Processor::new(memory);
    let stdout = io::stdout();
    cpu.run(&mut stdout.lock())
        .wrap_err_with(|| format!("{} stopped", args.program.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_program() {
        assert!(Args::try_parse_from(["ls8"]).is_err());
        assert!(Args::try_parse_from(["ls8", "a.ls8", "b.ls8"]).is_err());

        let args = Args::try_parse_from(["ls8", "a.ls8"]).expect("one program parses");
        assert_eq!(args.program, PathBuf::from("a.ls8"));
        assert_eq!(args.level(), LevelFilter::Warn);
    }

    #[test]
    fn test_trace_enables_trace_logging() {
        let args = Args::try_parse_from(["ls8", "--trace", "a.ls8"]).expect("flags parse");

        assert!(args.trace);
        assert_eq!(args.level(), LevelFilter::Trace);
    }
}
