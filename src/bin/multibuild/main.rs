//! Multibuild CLI - build one C project with many Windows toolchains

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use multibuild::core::TargetError;

mod cli;
mod commands;

use cli::Cli;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("multibuild=debug")
    } else {
        EnvFilter::new("multibuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    commands::build::execute(cli)
}

/// Print an error to stderr. Target errors get the full diagnostic with help.
fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<TargetError>() {
        Some(target_err) => eprintln!("{:?}", miette::Report::new(target_err.clone())),
        None => eprintln!("error: {:#}", e),
    }
}
