//! `multibuild [TOKENS]...` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Cli;
use multibuild::builder::SystemExecutor;
use multibuild::core::BuildRequest;
use multibuild::ops::{build, plan, smoke_run, BuildOptions};
use multibuild::util::config::{
    find_config, global_toolchains_path, load_config, BuildConfig, CONFIG_FILE_NAME,
};

/// Work out the project root and config file from `--root` and `--config`.
fn locate(cli: &Cli) -> Result<(PathBuf, PathBuf)> {
    let config_path = match (&cli.config, &cli.root) {
        (Some(path), _) => path.clone(),
        (None, Some(root)) => root.join(CONFIG_FILE_NAME),
        (None, None) => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            find_config(&cwd)?
        }
    };

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => config_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default(),
    };

    Ok((root, config_path))
}

fn load(cli: &Cli) -> Result<BuildConfig> {
    let (root, config_path) = locate(cli)?;
    let global = if cli.no_global {
        None
    } else {
        global_toolchains_path()
    };

    load_config(&root, &config_path, global.as_deref())
}

/// Returns whether an artifact was produced.
pub fn execute(cli: Cli) -> Result<bool> {
    let config = load(&cli)?;
    let request = BuildRequest::parse(&config, &cli.tokens);

    let opts = BuildOptions {
        plan: cli.plan,
        run_after: request.run_after,
    };

    if opts.plan {
        let plan = plan(&config, &request.target)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(true);
    }

    let report = build(&config, &request.target, &SystemExecutor)?;

    let Some(artifact) = report.artifact else {
        eprintln!(
            "error: could not build `{}` ({}): {} of {} step(s) failed",
            config.project.name,
            request.target,
            report.outcome.failure_count(),
            report.outcome.attempted()
        );
        return Ok(false);
    };

    eprintln!(
        "    Finished `{}` -> {}",
        config.project.name,
        artifact.display()
    );

    // The smoke run never changes the exit code.
    if opts.run_after {
        if let Err(e) = smoke_run(&artifact) {
            tracing::warn!("could not run {}: {:#}", artifact.display(), e);
        }
    }

    Ok(true)
}
