//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod quote;

pub use config::BuildConfig;
pub use process::{CommandResult, ProcessBuilder};
