//! Multibuild - one C project, many Windows toolchains
//!
//! This crate provides the core library functionality for multibuild:
//! target selection and validation, the GCC-class and VC-class drivers,
//! and the shared compile/resource/link pipeline.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for multibuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a fixture configuration and a scripted
/// executor that records steps instead of spawning tools.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildReport, ToolchainClass};
pub use crate::core::{BuildRequest, TargetDescriptor, TargetError};
pub use util::config::BuildConfig;
