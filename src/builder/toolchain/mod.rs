//! Toolchain drivers.
//!
//! A driver turns a resolved [`BuildContext`] into the concrete commands of
//! one toolchain family. Every driver runs the same pipeline (compile each
//! source, compile each resource in two dependent steps, link), with the same
//! artifact naming and failure policy; only the commands differ.
//!
//! Two families exist:
//! - `gcc`: GNU-style drivers (MinGW). Tools are spawned directly.
//! - `vc`: Microsoft-style multi-tool chains. Every tool runs in the same
//!   shell as the environment-setup script it depends on.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::builder::context::BuildContext;
use crate::builder::executor::{CommandExecutor, Invocation};
use crate::builder::outcome::BuildReport;
use crate::builder::pipeline::run_pipeline;

mod gcc;
mod msvc;

pub use gcc::GccDriver;
pub use msvc::MsvcDriver;

/// The family of command-line conventions a compiler follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainClass {
    /// GNU-style (gcc, windres)
    Gcc,
    /// Microsoft-style (cl, link, rc, cvtres)
    Vc,
}

impl ToolchainClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainClass::Gcc => "gcc",
            ToolchainClass::Vc => "vc",
        }
    }
}

impl fmt::Display for ToolchainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command to execute: program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Program followed by arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Short tool name for progress lines: `C:\MinGW\bin\gcc.exe` -> `gcc`.
///
/// Both separators are honored since configured paths are often Windows
/// paths regardless of the host.
pub fn tool_stem(path: &Path) -> String {
    let text = path.to_string_lossy();
    let name = text.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(&text);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Trait for toolchain drivers.
///
/// Implementors describe commands; the shared pipeline decides what runs and
/// how failures aggregate.
pub trait ToolchainDriver {
    /// The class this driver handles.
    fn class(&self) -> ToolchainClass;

    /// Include-path flag for a runtime's headers.
    fn include_flag(&self, dir: &Path) -> String;

    /// Library search-path flag for a runtime's import libraries.
    fn library_dir_flag(&self, dir: &Path) -> String;

    /// Flag that links a library by base name.
    fn library_flag(&self, name: &str) -> String;

    /// Compile one source into one object file.
    fn compile_command(&self, ctx: &BuildContext, source: &Path, object: &Path) -> CommandSpec;

    /// The two dependent resource commands: script to intermediate `.res`,
    /// then to a linkable object.
    fn resource_commands(
        &self,
        ctx: &BuildContext,
        script: &Path,
        res_file: &Path,
        object: &Path,
    ) -> (CommandSpec, CommandSpec);

    /// Link all objects into the artifact.
    fn link_command(&self, ctx: &BuildContext, objects: &[PathBuf]) -> CommandSpec;

    /// Turn a command into something the executor can run.
    fn invocation(&self, _ctx: &BuildContext, spec: CommandSpec) -> Invocation {
        Invocation::Direct(spec)
    }

    /// Check that every tool the pipeline will need is configured.
    fn check_tools(&self, ctx: &BuildContext) -> Result<()> {
        if !ctx.resources.is_empty() && ctx.tools.resource_compiler.is_none() {
            bail!(
                "compiler `{}` has no resource compiler configured for {}",
                ctx.target.compiler,
                ctx.target.architecture
            );
        }
        Ok(())
    }

    /// Run the full pipeline and return the report.
    ///
    /// Creates the object and output directories first. Object files are
    /// left in place whatever the outcome.
    fn build(&self, ctx: &BuildContext, executor: &dyn CommandExecutor) -> Result<BuildReport> {
        self.check_tools(ctx)?;
        ctx.prepare()?;
        Ok(run_pipeline(self, ctx, executor))
    }
}

/// Get the driver for a toolchain class.
pub fn driver_for(class: ToolchainClass) -> Box<dyn ToolchainDriver> {
    match class {
        ToolchainClass::Gcc => Box::new(GccDriver),
        ToolchainClass::Vc => Box::new(MsvcDriver),
    }
}
