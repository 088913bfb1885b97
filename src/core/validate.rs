//! Target validation.
//!
//! A requested target is checked against the configuration before anything
//! touches the filesystem or spawns a process, so a bad target never leaves
//! half-created object directories behind.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::target::{Architecture, TargetDescriptor};
use crate::util::config::{ArchitectureToolset, BuildConfig, CompilerConfig, RuntimeInstall};

/// A target that does not exist in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TargetError {
    #[error("invalid compiler `{compiler}`")]
    #[diagnostic(code(multibuild::target::compiler))]
    UnknownCompiler {
        compiler: String,
        #[help]
        available: Option<String>,
    },

    #[error("invalid architecture `{architecture}` for compiler `{compiler}`")]
    #[diagnostic(
        code(multibuild::target::architecture),
        help("add an `architectures.{architecture}` table to the `{compiler}` compiler")
    )]
    UnsupportedArchitecture {
        compiler: String,
        architecture: Architecture,
    },

    #[error("invalid runtime version `{runtime}`")]
    #[diagnostic(code(multibuild::target::runtime))]
    UnknownRuntime {
        runtime: String,
        #[help]
        available: Option<String>,
    },

    #[error("invalid runtime architecture `{architecture}` for runtime `{runtime}`")]
    #[diagnostic(
        code(multibuild::target::runtime_architecture),
        help("add an `architectures.{architecture}` table to runtime `{runtime}`")
    )]
    UnsupportedRuntimeArchitecture {
        runtime: String,
        architecture: Architecture,
    },
}

impl TargetError {
    /// The descriptor field category that failed.
    pub fn category(&self) -> &'static str {
        match self {
            TargetError::UnknownCompiler { .. } => "compiler",
            TargetError::UnsupportedArchitecture { .. } => "architecture",
            TargetError::UnknownRuntime { .. } => "runtime",
            TargetError::UnsupportedRuntimeArchitecture { .. } => "runtime architecture",
        }
    }
}

fn available_keys<'a>(keys: impl Iterator<Item = &'a String>) -> Option<String> {
    let keys: Vec<&str> = keys.map(String::as_str).collect();
    if keys.is_empty() {
        None
    } else {
        Some(format!("available: {}", keys.join(", ")))
    }
}

/// Configuration entries a valid target resolves to.
#[derive(Debug, Clone, Copy)]
pub struct TargetEntries<'a> {
    pub compiler: &'a CompilerConfig,
    pub toolset: &'a ArchitectureToolset,
    pub runtime: &'a RuntimeInstall,
}

/// Check that every field of `target` resolves in `config`.
///
/// Checks run in a fixed order (compiler, compiler architecture, runtime,
/// runtime architecture) and the first failure is returned.
pub fn validate(config: &BuildConfig, target: &TargetDescriptor) -> Result<(), TargetError> {
    resolve_entries(config, target).map(|_| ())
}

/// Like [`validate`], but hands back the entries on success.
pub fn resolve_entries<'a>(
    config: &'a BuildConfig,
    target: &TargetDescriptor,
) -> Result<TargetEntries<'a>, TargetError> {
    let compiler = config
        .compiler(&target.compiler)
        .ok_or_else(|| TargetError::UnknownCompiler {
            compiler: target.compiler.clone(),
            available: available_keys(config.compilers.keys()),
        })?;

    let toolset = compiler
        .architectures
        .get(target.architecture)
        .ok_or_else(|| TargetError::UnsupportedArchitecture {
            compiler: target.compiler.clone(),
            architecture: target.architecture,
        })?;

    let runtime = config
        .runtime(&target.runtime)
        .ok_or_else(|| TargetError::UnknownRuntime {
            runtime: target.runtime.clone(),
            available: available_keys(config.runtimes.keys()),
        })?;

    let runtime = runtime
        .architectures
        .get(target.architecture)
        .ok_or_else(|| TargetError::UnsupportedRuntimeArchitecture {
            runtime: target.runtime.clone(),
            architecture: target.architecture,
        })?;

    Ok(TargetEntries {
        compiler,
        toolset,
        runtime,
    })
}
