//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};

/// Outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code was reported and was zero
    pub success: bool,
    /// Stdout and stderr as one stream, in the order the tool wrote them
    pub output: String,
}

impl CommandResult {
    /// A successful result with the given output.
    pub fn success(output: impl Into<String>) -> Self {
        CommandResult {
            success: true,
            output: output.into(),
        }
    }

    /// A failed result with the given output.
    pub fn failure(output: impl Into<String>) -> Self {
        CommandResult {
            success: false,
            output: output.into(),
        }
    }

    /// Classify a finished process.
    ///
    /// A missing exit code (killed by a signal) counts as failure.
    pub fn from_captured(status: ExitStatus, output: &[u8]) -> Self {
        CommandResult {
            success: status.code() == Some(0),
            output: String::from_utf8_lossy(output).into_owned(),
        }
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    /// Command line handed verbatim to the interpreter
    shell_line: Option<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            shell_line: None,
        }
    }

    /// Run a whole command line through the platform command interpreter.
    ///
    /// `cmd /C` on Windows, `sh -c` elsewhere.
    pub fn shell(command_line: impl Into<String>) -> Self {
        let (interpreter, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let mut builder = ProcessBuilder::new(interpreter).arg(flag);
        builder.shell_line = Some(command_line.into());
        builder
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref line) = self.shell_line {
            append_shell_line(&mut cmd, line);
        }

        cmd
    }

    /// Execute the command and wait for completion.
    ///
    /// Stdout and stderr share one pipe, so the captured bytes keep the
    /// order in which the tool wrote them.
    pub fn exec(&self) -> Result<(ExitStatus, Vec<u8>)> {
        let (mut reader, writer) = std::io::pipe().context("failed to create output pipe")?;
        let err_writer = writer
            .try_clone()
            .context("failed to duplicate output pipe")?;

        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(writer);
        cmd.stderr(err_writer);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        // Our copies of the write end must be closed before EOF can arrive.
        drop(cmd);

        let mut output = Vec::new();
        reader
            .read_to_end(&mut output)
            .with_context(|| format!("failed to read output of `{}`", self.program.display()))?;

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        Ok((status, output))
    }

    /// Execute and classify the result.
    ///
    /// Never errors: a process that cannot be spawned is a failed result
    /// whose output is the spawn error.
    pub fn run(&self) -> CommandResult {
        match self.exec() {
            Ok((status, output)) => CommandResult::from_captured(status, &output),
            Err(e) => CommandResult::failure(format!("{:#}\n", e)),
        }
    }

    /// Execute with inherited stdio and return status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }
}

#[cfg(windows)]
fn append_shell_line(cmd: &mut Command, line: &str) {
    // cmd.exe does its own parsing; Rust's argument quoting would break it.
    // `/C` strips the first and last quote of the line when it holds more
    // than two, so the line gets an outer pair for it to remove.
    use std::os::windows::process::CommandExt;
    cmd.raw_arg(format!("\"{}\"", line));
}

#[cfg(not(windows))]
fn append_shell_line(cmd: &mut Command, line: &str) {
    cmd.arg(line);
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a configured tool path.
///
/// Bare names (`gcc`, `cl`) are looked up in PATH; anything with a directory
/// component is used verbatim. Unresolvable names are returned unchanged so
/// the spawn failure shows up in the step's diagnostic block.
pub fn resolve_tool(path: &Path) -> PathBuf {
    let is_bare = path.components().count() == 1 && !path.is_absolute();
    if !is_bare {
        return path.to_path_buf();
    }

    match path.to_str().and_then(find_executable) {
        Some(found) => found,
        None => {
            tracing::debug!("`{}` not found in PATH", path.display());
            path.to_path_buf()
        }
    }
}
