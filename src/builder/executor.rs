//! Command execution for pipeline steps.
//!
//! The pipeline never spawns processes itself; it hands each step to a
//! [`CommandExecutor`]. [`SystemExecutor`] runs the real tools,
//! [`PlanExecutor`] only records what would run.

use std::cell::RefCell;

use serde::Serialize;

use crate::builder::outcome::Step;
use crate::builder::toolchain::CommandSpec;
use crate::util::process::{CommandResult, ProcessBuilder};
use crate::util::quote::format_command_line;

/// How a command is handed to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Spawned directly from an argument vector; no quoting involved.
    Direct(CommandSpec),
    /// A complete command line run through the command interpreter.
    Shell(String),
}

impl Invocation {
    /// Chain a setup command and a tool command in one shell invocation.
    pub fn chained(setup: &[String], spec: &CommandSpec) -> Self {
        Invocation::Shell(format!(
            "{} && {}",
            format_command_line(setup, false),
            format_command_line(spec.argv(), false)
        ))
    }

    /// The command as a single line, for logs and diagnostics.
    pub fn command_line(&self) -> String {
        match self {
            Invocation::Direct(spec) => format_command_line(spec.argv(), false),
            Invocation::Shell(line) => line.clone(),
        }
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, Invocation::Shell(_))
    }

    fn process_builder(&self) -> ProcessBuilder {
        match self {
            Invocation::Direct(spec) => ProcessBuilder::new(&spec.program).args(&spec.args),
            Invocation::Shell(line) => ProcessBuilder::shell(line.as_str()),
        }
    }
}

/// Runs one pipeline step.
///
/// Implementations classify the result and nothing else; reporting failures
/// is up to the caller.
pub trait CommandExecutor {
    fn run(&self, step: &Step, invocation: &Invocation) -> CommandResult;
}

/// Spawns real processes and waits for each to finish.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn run(&self, step: &Step, invocation: &Invocation) -> CommandResult {
        tracing::debug!("[{}] {}", step.kind, invocation.command_line());
        invocation.process_builder().run()
    }
}

/// A command that would run, as shown in a build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    #[serde(flatten)]
    pub step: Step,
    pub command: String,
    pub shell: bool,
}

/// Records every step and reports success without running anything.
#[derive(Debug, Default)]
pub struct PlanExecutor {
    commands: RefCell<Vec<PlannedCommand>>,
}

impl PlanExecutor {
    pub fn new() -> Self {
        PlanExecutor::default()
    }

    /// Commands recorded so far, in order.
    pub fn into_commands(self) -> Vec<PlannedCommand> {
        self.commands.into_inner()
    }
}

impl CommandExecutor for PlanExecutor {
    fn run(&self, step: &Step, invocation: &Invocation) -> CommandResult {
        self.commands.borrow_mut().push(PlannedCommand {
            step: step.clone(),
            command: invocation.command_line(),
            shell: invocation.is_shell(),
        });
        CommandResult::success("")
    }
}
