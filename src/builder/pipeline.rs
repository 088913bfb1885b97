//! The compile, resource and link pipeline shared by all drivers.
//!
//! Steps run strictly one after another. Failures in independent steps do
//! not stop the run, so one build reports every broken source at once:
//! - every source is compiled, whatever happened to the previous one
//! - a resource's conversion step is skipped when its compile step failed,
//!   other resources still run
//! - the link runs only if nothing failed before it

use std::path::PathBuf;

use crate::builder::context::BuildContext;
use crate::builder::executor::CommandExecutor;
use crate::builder::outcome::{BuildOutcome, BuildReport, Step, StepKind};
use crate::builder::toolchain::{tool_stem, CommandSpec, ToolchainDriver};
use crate::util::diagnostic::emit_failure;

/// Run one step, print its diagnostic block on failure, and record it.
fn run_step<D: ToolchainDriver + ?Sized>(
    driver: &D,
    ctx: &BuildContext,
    executor: &dyn CommandExecutor,
    outcome: &mut BuildOutcome,
    step: Step,
    spec: CommandSpec,
) -> bool {
    let invocation = driver.invocation(ctx, spec);
    let result = executor.run(&step, &invocation);
    let command = invocation.command_line();

    if !result.success {
        emit_failure(&command, &result.output);
    }
    outcome.record(&step, &command, result.success)
}

/// Run every step for `ctx` with `driver`'s commands.
///
/// Expects the directories from [`BuildContext::prepare`] to exist when the
/// executor spawns real tools.
pub fn run_pipeline<D: ToolchainDriver + ?Sized>(
    driver: &D,
    ctx: &BuildContext,
    executor: &dyn CommandExecutor,
) -> BuildReport {
    let mut outcome = BuildOutcome::default();
    let mut objects: Vec<PathBuf> = Vec::with_capacity(ctx.sources.len() + ctx.resources.len());

    let compiler_name = tool_stem(&ctx.tools.compiler);
    for source in &ctx.sources {
        let object = ctx.object_path(source, "obj");
        objects.push(object.clone());

        tracing::info!("{}: compiling {}", compiler_name, source.display());

        let spec = driver.compile_command(ctx, &ctx.source_path(source), &object);
        run_step(driver, ctx, executor, &mut outcome, Step::new(StepKind::Compile, source), spec);
    }

    let resource_tool_name = ctx
        .tools
        .resource_compiler
        .as_deref()
        .map(tool_stem)
        .unwrap_or_default();
    for resource in &ctx.resources {
        let res_file = ctx.object_path(resource, "res");
        let object = ctx.object_path(resource, "coff");
        objects.push(object.clone());

        tracing::info!("{}: compiling {}", resource_tool_name, resource.display());

        let (compile, convert) =
            driver.resource_commands(ctx, &ctx.resource_path(resource), &res_file, &object);

        let compiled = run_step(
            driver,
            ctx,
            executor,
            &mut outcome,
            Step::new(StepKind::ResourceCompile, resource),
            compile,
        );
        if !compiled {
            continue;
        }

        run_step(
            driver,
            ctx,
            executor,
            &mut outcome,
            Step::new(StepKind::ResourceConvert, resource),
            convert,
        );
    }

    if !outcome.is_clean() {
        tracing::warn!(
            "not linking {}: {} step(s) failed",
            ctx.artifact_stem(),
            outcome.failure_count()
        );
        return BuildReport {
            artifact: None,
            outcome,
            linked: false,
        };
    }

    let artifact_stem = ctx.artifact_stem();
    tracing::info!("{}: linking {}", tool_stem(&ctx.tools.linker), artifact_stem);

    let spec = driver.link_command(ctx, &objects);
    run_step(
        driver,
        ctx,
        executor,
        &mut outcome,
        Step {
            kind: StepKind::Link,
            input: artifact_stem,
        },
        spec,
    );

    BuildReport {
        artifact: outcome.is_clean().then(|| ctx.artifact_path.clone()),
        outcome,
        linked: true,
    }
}
