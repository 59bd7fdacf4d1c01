// crates/icd-rs-dump/src/main.rs

//! `icd-dump`: prints the canonical dump of an ICD file, one path per line.
//!
//! The output is sorted, so two revisions of the same ICD can be compared with
//! any line-based diff tool.

use clap::Parser;
use icd_rs::{DumpOptions, Dumper, IcdError, load_icd_from_str};
use log::{LevelFilter, debug, error, info};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "icd-dump", version, about, long_about = None)]
struct Cli {
    /// ICD file to dump.
    file: PathBuf,

    /// Print typeChanged markers.
    #[arg(short = 't', long)]
    keep_type_changed: bool,

    /// Print index fields.
    #[arg(short = 'i', long)]
    keep_index: bool,

    /// Prefix every node with its position in the list it was reached from.
    #[arg(short = 'o', long)]
    keep_order: bool,

    /// Omit fields with an empty value.
    #[arg(short = 'e', long)]
    ignore_empty: bool,

    /// JSON file with dump options. Flags given on the command line apply on top of it.
    #[arg(long, value_name = "PATH")]
    options: Option<PathBuf>,

    /// Dump only the sub-graph of the node with this index.
    #[arg(long, value_name = "N")]
    root_index: Option<u64>,

    /// Log level: off, error, warn, info, debug or trace.
    #[arg(short = 'l', long, value_name = "LEVEL", default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Write log records to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

// --- Errors ---

#[derive(Debug)]
enum CliError {
    Io { path: PathBuf, source: io::Error },
    Output(io::Error),
    Logging(log::SetLoggerError),
    Icd(IcdError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Output(e) => write!(f, "Cannot write output: {}", e),
            CliError::Logging(e) => write!(f, "Cannot install logger: {}", e),
            CliError::Icd(e) => write!(f, "{}", e),
        }
    }
}

impl From<IcdError> for CliError {
    fn from(e: IcdError) -> Self {
        CliError::Icd(e)
    }
}

// --- Entry point ---

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level, cli.log_file.as_deref()) {
        eprintln!("icd-dump: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("icd-dump: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), CliError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().map_err(CliError::Logging)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    // 1. Resolve options before touching the input.
    let options = dump_options(cli)?;
    debug!("Dump options: {:?}", options);

    // 2. Parse and resolve the document.
    let source = read(&cli.file)?;
    let document = load_icd_from_str(&source)?;
    info!(
        "Loaded {} with {} indexed elements",
        cli.file.display(),
        document.len()
    );

    // 3. Dump.
    let dumper = Dumper::new(&document, options);
    let dump = match cli.root_index {
        Some(index) => dumper.dump_index(index)?,
        None => dumper.dump(),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for path in dump.paths() {
        writeln!(out, "{}", path).map_err(CliError::Output)?;
    }
    out.flush().map_err(CliError::Output)
}

/// Builds the dump options from the optional JSON file and the command-line flags.
fn dump_options(cli: &Cli) -> Result<DumpOptions, CliError> {
    let mut options = match &cli.options {
        Some(path) => options_from_json(&read(path)?)?,
        None => DumpOptions::default(),
    };
    if cli.keep_type_changed {
        options.ignore_type_changed = false;
    }
    if cli.keep_index {
        options.ignore_index = false;
    }
    if cli.keep_order {
        options.ignore_order = false;
    }
    if cli.ignore_empty {
        options.ignore_empty = true;
    }
    Ok(options)
}

fn options_from_json(json: &str) -> Result<DumpOptions, IcdError> {
    serde_json::from_str(json)
        .map_err(|e| IcdError::Configuration(format!("Invalid dump options: {}", e)))
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
