//! fifocat - Copy a stream through an in-process fifoio pipe.

mod copy;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fifoio::{PipeConfig, DEFAULT_CAPACITY, ONE_KILOBYTE};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Copy a stream through an in-process fifoio pipe.
///
/// The input is read on a producer thread and written into a bounded pipe;
/// the main thread drains the pipe into the output.
#[derive(Parser, Debug)]
#[command(name = "fifocat")]
#[command(about = "Copy a stream through an in-process bounded pipe")]
#[command(version)]
struct Args {
    /// Input file (default: stdin)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Pipe capacity in bytes
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Producer read size in bytes
    #[arg(long, default_value_t = 64 * ONE_KILOBYTE)]
    chunk: usize,

    /// Per-call timeout on both pipe ends, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Verbose output (logs go to stderr)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn pipe_config(&self) -> PipeConfig {
        let config = PipeConfig::new().with_capacity(self.capacity);
        match self.timeout_ms {
            Some(ms) => config.with_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let input: Box<dyn Read + Send> = match &args.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("open input {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let stats = copy::copy_through_pipe(input, output, &args.pipe_config(), args.chunk)?;
    info!(
        bytes = stats.bytes,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "copy finished"
    );
    Ok(())
}
