//! Test utilities for multibuild unit tests.
//!
//! Provides a fixture configuration covering both toolchain classes and a
//! scripted executor that records pipeline steps instead of spawning tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use multibuild::test_support::{fixture_config, ScriptedExecutor};
//!
//! #[test]
//! fn test_example() {
//!     let config = fixture_config();
//!     let exec = ScriptedExecutor::new().fail_on("Broken.c");
//!
//!     // Run a pipeline against `exec`, then inspect `exec.steps()`...
//! }
//! ```

use std::cell::RefCell;

use crate::builder::executor::{CommandExecutor, Invocation};
use crate::builder::outcome::{Step, StepKind};
use crate::util::config::BuildConfig;
use crate::util::process::CommandResult;

/// Configuration used across unit tests.
///
/// Rooted at `/project`. Knows `gcc`, `vc9` and `vc10` on both
/// architectures, and runtimes `2` and `3` on both architectures.
pub const FIXTURE_CONFIG: &str = r#"
[project]
name = "pyp"
runtime_prefix = "py"
sources = ["Main.c"]

[defaults]
compiler = "gcc"
architecture = "x86"
mode = "debug"
type = "application"
runtime = "2"

[runtimes.2.architectures.x86]
path = "C:/Python2"
library = "python27"

[runtimes.2.architectures.x64]
path = "C:/Python2x64"
library = "python27"

[runtimes.3.architectures.x86]
path = "C:/Python3"
library = "python34"

[runtimes.3.architectures.x64]
path = "C:/Python3x64"
library = "python34"

# MinGW

[compilers.gcc]
class = "gcc"

[compilers.gcc.flags]
compiler_flags = { debug = ["-Wall", "-g", "-O0"], release = ["-Wall", "-O3", "-DNDEBUG"] }
linker_libraries = { debug = ["Shell32"], release = ["Shell32"] }

[compilers.gcc.architectures.x86]
compiler = "C:/MinGW/bin/gcc"
linker = "C:/MinGW/bin/gcc"
windres = "C:/MinGW/bin/windres"

[compilers.gcc.architectures.x64]
compiler = "C:/MinGW64/bin/gcc"
linker = "C:/MinGW64/bin/gcc"
windres = "C:/MinGW64/bin/windres"

[compilers.gcc.architectures.x64.flags]
compiler_flags = { debug = ["-DMS_WIN64"], release = ["-DMS_WIN64"] }

# Visual C++ 2008

[compilers.vc9]
class = "vc"

[compilers.vc9.flags]
compiler_flags = { debug = ["/W3", "/Zi", "/TC"], release = ["/W3", "/O2", "/TC"] }
linker_libraries = { debug = ["Shell32"], release = ["Shell32"] }

[compilers.vc9.architectures.x86]
compiler = "C:/Program Files/VC9/bin/cl"
linker = "C:/Program Files/VC9/bin/link"
rc = "C:/Program Files/SDK/v6.0A/bin/RC"
cvtres = "C:/Program Files/VC9/bin/cvtres"
setup = { debug = ["C:/Program Files/VC9/bin/vcvars32.bat"], release = ["C:/Program Files/VC9/bin/vcvars32.bat"] }

[compilers.vc9.architectures.x86.flags]
resource_flags = { debug = ["/MACHINE:X86"], release = ["/MACHINE:X86"] }

[compilers.vc9.architectures.x64]
compiler = "C:/VC9/bin/amd64/cl"
linker = "C:/VC9/bin/amd64/link"
rc = "C:/SDK/v6.0A/bin/RC"
cvtres = "C:/VC9/bin/amd64/cvtres"
setup = { debug = ["C:/VC9/bin/amd64/vcvarsamd64.bat"], release = ["C:/VC9/bin/amd64/vcvarsamd64.bat"] }

[compilers.vc9.architectures.x64.flags]
resource_flags = { debug = ["/MACHINE:X64"], release = ["/MACHINE:X64"] }

# Visual C++ 2010 with the Windows 7.1 SDK

[compilers.vc10]
class = "vc"

[compilers.vc10.flags]
compiler_flags = { debug = ["/W3", "/Zi", "/TC"], release = ["/W3", "/O2", "/TC"] }
linker_libraries = { debug = ["Shell32"], release = ["Shell32"] }

[compilers.vc10.architectures.x86]
compiler = "C:/VC10/bin/cl"
linker = "C:/VC10/bin/link"
rc = "C:/SDK/v7.1/Bin/RC"
cvtres = "C:/VC10/bin/cvtres"
setup = { debug = ["C:/SDK/v7.1/Bin/SetEnv.Cmd", "/x86"], release = ["C:/SDK/v7.1/Bin/SetEnv.Cmd", "/x86", "/Release"] }

[compilers.vc10.architectures.x86.flags]
linker_flags = { debug = ["/MACHINE:X86"], release = ["/MACHINE:X86"] }
resource_flags = { debug = ["/MACHINE:X86"], release = ["/MACHINE:X86"] }

[compilers.vc10.architectures.x64]
compiler = "C:/VC10/bin/amd64/cl"
linker = "C:/VC10/bin/amd64/link"
rc = "C:/SDK/v7.1/Bin/RC"
cvtres = "C:/VC9/bin/amd64/cvtres"
setup = { debug = ["C:/SDK/v7.1/Bin/SetEnv.Cmd", "/x64"], release = ["C:/SDK/v7.1/Bin/SetEnv.Cmd", "/x64", "/Release"] }

[compilers.vc10.architectures.x64.flags]
linker_flags = { debug = ["/MACHINE:X64"], release = ["/MACHINE:X64"] }
resource_flags = { debug = ["/MACHINE:X64"], release = ["/MACHINE:X64"] }
"#;

/// Parse [`FIXTURE_CONFIG`] rooted at `/project`.
pub fn fixture_config() -> BuildConfig {
    BuildConfig::parse(FIXTURE_CONFIG, "/project").expect("fixture config parses")
}

/// A step as seen by [`ScriptedExecutor`].
#[derive(Debug, Clone)]
pub struct RecordedStep {
    pub kind: StepKind,
    pub input: String,
    pub command: String,
    pub shell: bool,
}

/// Executor that records every step and fails the ones it is told to.
///
/// Nothing is spawned. Failed steps report `"error: <input>\n"` as output.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    fail_inputs: Vec<String>,
    fail_kinds: Vec<StepKind>,
    recorded: RefCell<Vec<RecordedStep>>,
}

impl ScriptedExecutor {
    /// Create an executor where every step succeeds.
    pub fn new() -> Self {
        ScriptedExecutor::default()
    }

    /// Fail every step whose input contains `input`.
    pub fn fail_on(mut self, input: impl Into<String>) -> Self {
        self.fail_inputs.push(input.into());
        self
    }

    /// Fail every step of the given kind.
    pub fn fail_kind(mut self, kind: StepKind) -> Self {
        self.fail_kinds.push(kind);
        self
    }

    pub fn kinds(&self) -> Vec<StepKind> {
        self.recorded.borrow().iter().map(|s| s.kind).collect()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.recorded.borrow().iter().map(|s| s.input.clone()).collect()
    }

    pub fn steps(&self) -> Vec<(StepKind, String)> {
        self.recorded
            .borrow()
            .iter()
            .map(|s| (s.kind, s.input.clone()))
            .collect()
    }

    pub fn commands(&self) -> Vec<String> {
        self.recorded.borrow().iter().map(|s| s.command.clone()).collect()
    }

    /// Command line of the last recorded step, or an empty string.
    pub fn last_command(&self) -> String {
        self.recorded
            .borrow()
            .last()
            .map(|s| s.command.clone())
            .unwrap_or_default()
    }

    pub fn shell_flags(&self) -> Vec<bool> {
        self.recorded.borrow().iter().map(|s| s.shell).collect()
    }

    fn should_fail(&self, step: &Step) -> bool {
        self.fail_kinds.contains(&step.kind)
            || self.fail_inputs.iter().any(|needle| step.input.contains(needle.as_str()))
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run(&self, step: &Step, invocation: &Invocation) -> CommandResult {
        self.recorded.borrow_mut().push(RecordedStep {
            kind: step.kind,
            input: step.input.clone(),
            command: invocation.command_line(),
            shell: invocation.is_shell(),
        });

        if self.should_fail(step) {
            CommandResult::failure(format!("error: {}\n", step.input))
        } else {
            CommandResult::success("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::CommandSpec;
    use std::path::Path;

    #[test]
    fn test_fixture_has_both_classes() {
        let config = fixture_config();
        assert_eq!(config.compilers.len(), 3);
        assert_eq!(config.runtimes.len(), 2);
    }

    #[test]
    fn test_scripted_executor_fails_matching_steps() {
        let exec = ScriptedExecutor::new()
            .fail_on("Broken")
            .fail_kind(StepKind::Link);
        let direct = Invocation::Direct(CommandSpec::new("gcc"));

        assert!(exec.run(&Step::new(StepKind::Compile, Path::new("Main.c")), &direct).success);
        let failed = exec.run(&Step::new(StepKind::Compile, Path::new("Broken.c")), &direct);
        assert!(!failed.success);
        assert_eq!(failed.output, "error: Broken.c\n");
        assert!(!exec.run(&Step::new(StepKind::Link, Path::new("pyp")), &direct).success);

        assert_eq!(exec.inputs(), vec!["Main.c", "Broken.c", "pyp"]);
        assert_eq!(exec.last_command(), "gcc");
    }
}
