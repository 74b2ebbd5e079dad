//! Compare an output trace dump against an expected one.
//!
//! # Usage
//!
//! ```bash
//! data-validator expected.json output.json
//! RUST_LOG=debug data-validator expected.json output.json
//! ```
//!
//! Exits with 0 when the dumps match and 1 otherwise, including when either
//! file cannot be read, parsed or decoded.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use trace_data_validator::{validate_files, Verdict};

#[derive(Parser)]
#[command(name = "data-validator")]
#[command(about = "Structurally compare an output trace dump against an expected one")]
#[command(version)]
struct Cli {
    /// Path to the expected trace dump (JSON).
    expected: PathBuf,

    /// Path to the output trace dump (JSON).
    output: PathBuf,

    /// Don't print the mismatch report.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match validate_files(&cli.expected, &cli.output) {
        Ok(Verdict::Match) => ExitCode::SUCCESS,
        Ok(Verdict::Mismatch(mismatch)) => {
            if !cli.quiet {
                eprintln!("mismatch: {mismatch}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
