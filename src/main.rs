use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use hack_ensemble::err::{self, Error as _};
use hack_ensemble::file::{self, FileErr};

/// Assembler for the Hack 16-bit computer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Assembly source file (must end in `.asm`).
    input: PathBuf,

    /// File to which the assembled words are written.
    /// Defaults to the input path with a `.hack` extension.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the assembled words instead of writing a file.
    #[arg(long)]
    stdout: bool,
}

#[derive(Debug)]
enum Fail {
    /// The input could not be assembled.
    AsmFail(FileErr),
    /// The logger could not be set up.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(FileErr::Assemble(e)) => f.write_str(&err::report(e)),
            Fail::AsmFail(e) => {
                write!(f, "error: {e}")?;
                match e.help() {
                    Some(help) => write!(f, "\n  help: {help}"),
                    None => Ok(()),
                }
            },
            Fail::InitialisationFailure(msg) => f.write_str(msg),
        }
    }
}

impl Error for Fail {}

fn run_assembler() -> Result<(), Fail> {
    let cli = Cli::parse();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&cli.log_level))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (check RUST_LOG or --log-level): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let output = cli.output.clone().unwrap_or_else(|| file::output_path(&cli.input));
    let span = span!(Level::ERROR, "assemble", input=?cli.input, output=?output);
    let _enter = span.enter();

    let result = if cli.stdout {
        file::assemble_path(&cli.input).map(|text| println!("{text}"))
    } else {
        file::assemble_file(&cli.input, &output)
    };

    match result {
        Ok(()) => {
            event!(Level::INFO, "assembly succeeded");
            Ok(())
        },
        Err(e) => {
            event!(Level::DEBUG, "assembly failed: {e:?}");
            Err(Fail::AsmFail(e))
        }
    }
}

fn main() {
    match run_assembler() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
