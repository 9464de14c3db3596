// src/bin/ycc.rs

use std::fs;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use ycc::cli::Args;

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("YCC_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("ycc: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Compile the input and write the IR. Returns `false` when the source had
/// errors.
fn run(args: &Args) -> anyhow::Result<bool> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let output = ycc::compile(&source, &args.compile_options());
    eprint!("{}", output.diagnostics);

    let Some(ir) = output.ir else {
        return Ok(false);
    };
    match args.output_path() {
        Some(path) => fs::write(&path, ir)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(ir.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(!output.diagnostics.has_errors())
}
