//! Compile, resource and link pipeline.
//!
//! This module turns a validated target into tool invocations and runs them.

pub mod context;
pub mod executor;
pub mod outcome;
pub mod pipeline;
pub mod toolchain;

pub use context::BuildContext;
pub use executor::{CommandExecutor, Invocation, PlanExecutor, SystemExecutor};
pub use outcome::{BuildOutcome, BuildReport, FailedStep, Step, StepKind};
pub use toolchain::{driver_for, CommandSpec, GccDriver, MsvcDriver, ToolchainClass, ToolchainDriver};
