//! Implementation of `multibuild [TOKENS]...`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::executor::{CommandExecutor, PlanExecutor, PlannedCommand};
use crate::builder::outcome::BuildReport;
use crate::builder::pipeline::run_pipeline;
use crate::builder::toolchain::{driver_for, ToolchainClass, ToolchainDriver};
use crate::core::target::TargetDescriptor;
use crate::core::validate::validate;
use crate::util::config::BuildConfig;
use crate::util::process::ProcessBuilder;

/// Argument passed to a freshly built artifact by the `run` token.
pub const SMOKE_RUN_ARG: &str = "--version";

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Resolve and list commands without running anything
    pub plan: bool,

    /// Run the artifact with `--version` after a successful build
    pub run_after: bool,
}

/// Everything that would run for one target, in order.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub target: TargetDescriptor,
    pub class: ToolchainClass,
    pub artifact: PathBuf,
    pub object_dir: PathBuf,
    pub commands: Vec<PlannedCommand>,
}

/// Validate the target and pick the driver for its compiler class.
///
/// Nothing is created on disk before this succeeds.
fn resolve(
    config: &BuildConfig,
    target: &TargetDescriptor,
) -> Result<(BuildContext, Box<dyn ToolchainDriver>)> {
    validate(config, target)?;

    let class = config
        .compiler(&target.compiler)
        .map(|c| c.class)
        .with_context(|| format!("compiler `{}` disappeared from config", target.compiler))?;

    let ctx = BuildContext::resolve(config, target)?;
    let driver = driver_for(class);

    tracing::debug!(
        "building {} with the {} driver ({} source(s), {} resource(s))",
        target,
        class,
        ctx.sources.len(),
        ctx.resources.len()
    );

    Ok((ctx, driver))
}

/// Build one target.
///
/// Configuration errors (including [`TargetError`](crate::core::validate::TargetError))
/// are returned as errors. Tool failures are not: they end up in the
/// report's outcome, and the report carries no artifact.
pub fn build(
    config: &BuildConfig,
    target: &TargetDescriptor,
    executor: &dyn CommandExecutor,
) -> Result<BuildReport> {
    let (ctx, driver) = resolve(config, target)?;
    let report = driver.build(&ctx, executor)?;

    match &report.artifact {
        Some(path) => tracing::debug!("produced {}", path.display()),
        None => {
            for failed in report.outcome.failures() {
                tracing::debug!("failed: {}", failed);
            }
        }
    }

    Ok(report)
}

/// List the commands a build would run, without spawning tools or creating
/// directories. Every step is assumed to succeed.
pub fn plan(config: &BuildConfig, target: &TargetDescriptor) -> Result<BuildPlan> {
    let (ctx, driver) = resolve(config, target)?;
    driver.check_tools(&ctx)?;

    let executor = PlanExecutor::new();
    run_pipeline(driver.as_ref(), &ctx, &executor);

    Ok(BuildPlan {
        target: target.clone(),
        class: driver.class(),
        artifact: ctx.artifact_path.clone(),
        object_dir: ctx.object_dir.clone(),
        commands: executor.into_commands(),
    })
}

/// Run a built artifact with `--version`, stdio inherited.
///
/// Returns whether it exited successfully.
pub fn smoke_run(artifact: &Path) -> Result<bool> {
    let status = ProcessBuilder::new(artifact).arg(SMOKE_RUN_ARG).status()?;
    if !status.success() {
        tracing::warn!("`{} {}` exited with {}", artifact.display(), SMOKE_RUN_ARG, status);
    }
    Ok(status.success())
}
