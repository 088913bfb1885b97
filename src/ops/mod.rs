//! High-level operations.
//!
//! This module contains the implementation of the multibuild command.

pub mod build;

pub use build::{build, plan, smoke_run, BuildOptions, BuildPlan};
