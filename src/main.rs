//! Stream Engine CLI
//!
//! Replays a CSV batch of stream commands and outputs the final state of
//! every stream.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > streams.csv
//! cargo run -- commands.csv events.csv > streams.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process;
use stream_engine::{BatchProcessor, BatchResult, EngineError};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> BatchResult<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(EngineError::MissingArgument);
    }

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let mut processor = BatchProcessor::new();
    processor.process_csv(reader)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    processor.write_streams(handle)?;

    if let Some(events_path) = args.get(2) {
        let events_file = File::create(events_path)?;
        processor.write_events(BufWriter::new(events_file))?;
    }

    Ok(())
}
