//! Result aggregation for a pipeline run.
//!
//! Independent steps keep running after a failure, so a run can collect
//! several failures. [`BuildOutcome`] keeps the list of failed steps; "did
//! anything fail" and "what failed" are separate questions on it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Kind of pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// Source to object file
    Compile,
    /// Resource script to intermediate `.res`
    ResourceCompile,
    /// Intermediate resource to linkable object
    ResourceConvert,
    /// Objects to artifact
    Link,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Compile => "compile",
            StepKind::ResourceCompile => "resource-compile",
            StepKind::ResourceConvert => "resource-convert",
            StepKind::Link => "link",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the pipeline: what kind, and which input it works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub input: String,
}

impl Step {
    pub fn new(kind: StepKind, input: &Path) -> Self {
        Step {
            kind,
            input: input.display().to_string(),
        }
    }
}

/// A step whose command failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedStep {
    pub kind: StepKind,
    pub input: String,
    pub command: String,
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.input)
    }
}

/// Aggregated result of all steps run so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    attempted: usize,
    failures: Vec<FailedStep>,
}

impl BuildOutcome {
    /// Record the result of a step. Returns whether the step succeeded.
    pub fn record(&mut self, step: &Step, command: &str, success: bool) -> bool {
        self.attempted += 1;
        if !success {
            self.failures.push(FailedStep {
                kind: step.kind,
                input: step.input.clone(),
                command: command.to_string(),
            });
        }
        success
    }

    /// No step has failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[FailedStep] {
        &self.failures
    }

    /// Number of steps run, successful or not.
    pub fn attempted(&self) -> usize {
        self.attempted
    }
}

/// What a driver hands back after a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Set only when every step, link included, succeeded
    pub artifact: Option<PathBuf>,
    pub outcome: BuildOutcome,
    /// Whether the link step ran at all
    pub linked: bool,
}

impl BuildReport {
    pub fn succeeded(&self) -> bool {
        self.artifact.is_some()
    }
}
