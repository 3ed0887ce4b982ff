use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::memory::StdMem;
use ls8::processor::Processor;

/// Runs an LS-8 program image
#[derive(Parser, Debug)]
#[command(name = "ls8", version, about)]
struct Cli {
    /// Program image, one binary byte per line
    program: PathBuf,

    /// Log a trace line before every instruction
    #[arg(short, long)]
    trace: bool,

    /// Log the memory contents after loading
    #[arg(long)]
    dump: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Log lines
    /// share stdout with printed values.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        if self.trace {
            return LevelFilter::Trace;
        }

        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        if self.dump {
            level.max(LevelFilter::Info)
        } else {
            level
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let cli = Cli::parse();
    SimpleLogger::new().with_level(cli.level()).init()?; // logging

    let mem = StdMem::from_file(&cli.program)?;
    if cli.dump {
        mem.dump();
    }

    let mut cpu = Processor::with_memory(mem);
    let stdout = io::stdout();
    cpu.execute_until_halt(&mut stdout.lock())?;

    Ok(())
}
