//! CLI integration tests for multibuild.
//!
//! These tests drive the binary against fake toolchains: small shell scripts
//! that log their arguments and write the files a real tool would.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the multibuild binary command.
fn multibuild() -> Command {
    let mut cmd = Command::cargo_bin("multibuild").unwrap();
    cmd.arg("--no-global");
    cmd.env_remove("MULTIBUILD_ROOT");
    cmd
}

/// GNU-style compiler and linker. Fails on any `Broken.c` input.
const FAKE_GCC: &str = r#"#!/bin/sh
echo "gcc $*" >> "$(dirname "$0")/calls.log"
compile=0
out=""
prev=""
for a in "$@"; do
  case "$a" in
    -c) compile=1 ;;
    *Broken.c) echo "$a:1:1: error: expected ';' before '}' token" >&2; exit 1 ;;
  esac
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
if [ "$compile" = 1 ]; then
  echo object > "$out"
else
  printf '#!/bin/sh\necho "pyp 1.0 $*"\n' > "$out"
  chmod +x "$out"
fi
"#;

const FAKE_WINDRES: &str = r#"#!/bin/sh
echo "windres $*" >> "$(dirname "$0")/calls.log"
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then echo resource > "$a"; fi
  prev="$a"
done
"#;

/// Environment setup script for the VC-class fake toolchain.
const FAKE_SETUP: &str = r#"#!/bin/sh
echo "setup $*" >> "$(dirname "$0")/calls.log"
"#;

const FAKE_CL: &str = r#"#!/bin/sh
echo "cl $*" >> "$(dirname "$0")/calls.log"
for a in "$@"; do
  case "$a" in
    /Fo*) echo object > "${a#/Fo}" ;;
  esac
done
"#;

const FAKE_LINK: &str = r#"#!/bin/sh
echo "link $*" >> "$(dirname "$0")/calls.log"
for a in "$@"; do
  case "$a" in
    /OUT:*) out="${a#/OUT:}"; printf '#!/bin/sh\necho "pyp 1.0 $*"\n' > "$out"; chmod +x "$out" ;;
  esac
done
"#;

/// A project directory with fake tools under `tools/`.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let project = Project { dir };

        fs::create_dir_all(project.tools()).unwrap();
        project.tool("gcc", FAKE_GCC);
        project.tool("windres", FAKE_WINDRES);
        project.tool("setup", FAKE_SETUP);
        project.tool("cl", FAKE_CL);
        project.tool("link", FAKE_LINK);

        project
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn tools(&self) -> PathBuf {
        self.root().join("tools")
    }

    fn tool(&self, name: &str, script: &str) {
        let path = self.tools().join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn file(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Write `Multibuild.toml` with the given project table and default compiler.
    fn config(&self, sources: &[&str], resources: &[&str], default_compiler: &str) {
        let list = |items: &[&str]| {
            items
                .iter()
                .map(|s| format!("\"{}\"", s))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let tools = self.tools().display().to_string();

        let config = format!(
            r#"
[project]
name = "pyp"
sources = [{sources}]
resources = [{resources}]

[defaults]
compiler = "{default_compiler}"

[runtimes.2.architectures.x86]
path = "/opt/python2"
library = "python27"

[runtimes.3.architectures.x86]
path = "/opt/python3"
library = "python34"

[compilers.gcc]
class = "gcc"

[compilers.gcc.flags]
compiler_flags = {{ debug = ["-g"], release = ["-O2"] }}

[compilers.gcc.architectures.x86]
compiler = "{tools}/gcc"
linker = "{tools}/gcc"
windres = "{tools}/windres"

[compilers.gcc.architectures.x64]
compiler = "{tools}/gcc"
linker = "{tools}/gcc"
windres = "{tools}/windres"

[compilers.vc9]
class = "vc"

[compilers.vc9.architectures.x86]
compiler = "{tools}/cl"
linker = "{tools}/link"
rc = "{tools}/rc"
cvtres = "{tools}/cvtres"
setup = {{ debug = ["{tools}/setup", "/x86"], release = ["{tools}/setup", "/x86"] }}
"#,
            sources = list(sources),
            resources = list(resources),
        );
        self.file("Multibuild.toml", &config);
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.tools().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    fn cmd(&self) -> Command {
        let mut cmd = multibuild();
        cmd.arg("--root").arg(self.root());
        cmd
    }
}

// ============================================================================
// gcc class
// ============================================================================

#[test]
fn test_build_default_target() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");
    project.file("src/Main.c", "int main(void) { return 0; }\n");

    project
        .cmd()
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished `pyp`"));

    assert!(project.root().join("bin/pyp-py2-debug-gcc-x86.exe").is_file());
    assert!(project.root().join("obj/py2-debug-gcc-x86/Main.obj").is_file());

    let calls = project.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("gcc -c -I/opt/python2/include -g -o"));
    assert!(calls[1].ends_with("-lpython27"));
}

#[test]
fn test_tokens_select_target() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");

    project
        .cmd()
        .args(["PY3", "Release", "dll", "whatever"])
        .assert()
        .success();

    assert!(project.root().join("bin/pyp-py3-release-gcc-x86.dll").is_file());
    assert!(project.root().join("obj/py3-release-gcc-x86-dll").is_dir());

    let calls = project.calls();
    assert!(calls[0].contains("-O2"));
    assert!(calls[1].starts_with("gcc -shared"));
}

#[test]
fn test_failing_source_skips_link() {
    let project = Project::new();
    project.config(&["Main.c", "Broken.c", "Map.c"], &["Resources.rc"], "gcc");

    project
        .cmd()
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("=".repeat(80)))
        .stdout(predicate::str::contains("cmd = "))
        .stdout(predicate::str::contains("error: expected ';'"))
        .stderr(predicate::str::contains("1 of 5 step(s) failed"));

    let calls = project.calls();
    // Three compiles and two windres passes, no link
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().any(|c| c.contains("Map.c")));
    assert!(calls.iter().all(|c| !c.contains("/bin/pyp")));
    assert!(!project.root().join("bin/pyp-py2-debug-gcc-x86.exe").exists());
}

#[test]
fn test_resources_are_linked() {
    let project = Project::new();
    project.config(&["Main.c"], &["Resources.rc"], "gcc");

    project.cmd().assert().success();

    let calls = project.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[1].contains("-O res"));
    assert!(calls[2].contains("-O coff"));
    assert!(calls[3].contains("Resources.coff"));
}

#[test]
fn test_glob_sources() {
    let project = Project::new();
    project.config(&["*.c"], &[], "gcc");
    project.file("src/b.c", "");
    project.file("src/a.c", "");

    project.cmd().assert().success();

    let calls = project.calls();
    assert!(calls[0].ends_with("a.c"));
    assert!(calls[1].ends_with("b.c"));
}

#[test]
fn test_run_token_smoke_runs_artifact() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");

    project
        .cmd()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("pyp 1.0 --version"));
}

// ============================================================================
// vc class
// ============================================================================

#[test]
fn test_vc_tools_run_after_setup() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");

    project.cmd().arg("vc9").assert().success();

    let calls = project.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], "setup /x86");
    assert!(calls[1].starts_with("cl /c"));
    assert_eq!(calls[2], "setup /x86");
    assert!(calls[3].starts_with("link "));
    assert!(calls[3].ends_with("python27.lib"));
    assert!(project.root().join("bin/pyp-py2-debug-vc9-x86.exe").is_file());
}

#[test]
fn test_vc_failing_setup_fails_build() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "vc9");
    project.tool("setup", "#!/bin/sh\necho 'setup broke'\nexit 1\n");

    project
        .cmd()
        .assert()
        .failure()
        .stdout(predicate::str::contains("setup broke"));

    assert!(!project.root().join("bin/pyp-py2-debug-vc9-x86.exe").exists());
}

// ============================================================================
// configuration
// ============================================================================

#[test]
fn test_invalid_compiler_is_fatal() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "tcc");

    project
        .cmd()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid compiler `tcc`"));

    assert!(project.calls().is_empty());
    assert!(!project.root().join("obj").exists());
    assert!(!project.root().join("bin").exists());
}

#[test]
fn test_invalid_compiler_architecture_is_fatal() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");

    project
        .cmd()
        .args(["vc9", "x64"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid architecture `x64`"));

    assert!(project.calls().is_empty());
}

#[test]
fn test_invalid_runtime_architecture_is_fatal() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");

    project
        .cmd()
        .arg("x64")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid runtime architecture `x64`"));

    assert!(project.calls().is_empty());
    assert!(!project.root().join("obj").exists());
}

#[test]
fn test_missing_config() {
    let tmp = TempDir::new().unwrap();

    multibuild()
        .arg("--root")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_config_found_from_subdirectory() {
    let project = Project::new();
    project.config(&["Main.c"], &[], "gcc");
    project.file("src/Main.c", "");

    multibuild()
        .current_dir(project.root().join("src"))
        .assert()
        .success();

    assert!(project.root().join("bin/pyp-py2-debug-gcc-x86.exe").is_file());
}

#[test]
fn test_plan_prints_json_without_running() {
    let project = Project::new();
    project.config(&["Main.c"], &["Resources.rc"], "gcc");

    let output = project.cmd().arg("--plan").output().unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["class"], "gcc");
    assert_eq!(plan["target"]["runtime"], "2");
    assert_eq!(plan["commands"].as_array().unwrap().len(), 4);
    assert_eq!(plan["commands"][3]["kind"], "link");

    assert!(project.calls().is_empty());
    assert!(!project.root().join("obj").exists());
}
