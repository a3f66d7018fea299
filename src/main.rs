use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser};

use quadpix::codec;
use quadpix::error::CodecError;

/// Compress a binary PPM into 32-bit block code words, or decompress the
/// packed stream back into a PPM. Output goes to standard output.
#[derive(Parser)]
#[command(name = "quadpix",
          group(ArgGroup::new("mode").required(true).args(["compress", "decompress", "test"])))]
struct Args {
  /// Compress: read a PPM, write the packed stream
  #[arg(short = 'c', long = "compress")]
  compress: bool,

  /// Decompress: read a packed stream, write a PPM
  #[arg(short = 'd', long = "decompress")]
  decompress: bool,

  /// Compress then immediately decompress, writing the re-decoded PPM
  #[arg(short = 't', long = "test")]
  test: bool,

  /// Input file; standard input when omitted
  file: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), CodecError> {
  let mut input: Box<dyn Read> = match &args.file {
    Some(path) => Box::new(io::BufReader::new(File::open(path)?)),
    None => Box::new(io::BufReader::new(io::stdin())),
  };

  let stdout = io::stdout();
  let mut output = io::BufWriter::new(stdout.lock());

  if args.compress {
    codec::compress(&mut input, &mut output)?;
  } else if args.decompress {
    codec::decompress(&mut input, &mut output)?;
  } else {
    codec::round_trip(&mut input, &mut output)?;
  }

  output.flush()?;
  Ok(())
}

fn main() {
  env_logger::init();

  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(err) => {
      // Usage goes to stderr for real errors, stdout for --help/--version
      let _ = err.print();
      process::exit(if err.use_stderr() { 1 } else { 0 });
    }
  };

  if let Err(err) = run(&args) {
    eprintln!("quadpix: {}", err);
    process::exit(1);
  }
}
