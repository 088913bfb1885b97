//! GCC-class driver (MinGW and other GNU-style toolchains).

use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::core::target::BinaryType;

use super::{CommandSpec, ToolchainClass, ToolchainDriver};

/// GNU-style driver: one executable compiles and links, `windres` handles
/// resources. Tools are spawned directly from argument vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct GccDriver;

impl GccDriver {
    fn windres(ctx: &BuildContext) -> PathBuf {
        ctx.tools
            .resource_compiler
            .clone()
            .unwrap_or_else(|| PathBuf::from("windres"))
    }

    fn windres_pass(ctx: &BuildContext, format: &str, script: &Path, output: &Path) -> CommandSpec {
        CommandSpec::new(Self::windres(ctx))
            .args(["-J", "rc", "-O", format])
            .arg("-o")
            .arg(output.display().to_string())
            .arg(script.display().to_string())
    }
}

impl ToolchainDriver for GccDriver {
    fn class(&self) -> ToolchainClass {
        ToolchainClass::Gcc
    }

    fn include_flag(&self, dir: &Path) -> String {
        format!("-I{}", dir.display())
    }

    fn library_dir_flag(&self, dir: &Path) -> String {
        format!("-L{}", dir.display())
    }

    fn library_flag(&self, name: &str) -> String {
        format!("-l{}", name)
    }

    fn compile_command(&self, ctx: &BuildContext, source: &Path, object: &Path) -> CommandSpec {
        let mut cmd = CommandSpec::new(&ctx.tools.compiler);

        // Compile only
        cmd = cmd.arg("-c");

        // Runtime headers, then configured flags
        cmd = cmd.arg(self.include_flag(&ctx.runtime.include_dir()));
        cmd = cmd.args(ctx.flags.compile.iter().cloned());

        // Output and input
        cmd = cmd.arg("-o");
        cmd = cmd.arg(object.display().to_string());
        cmd = cmd.arg(source.display().to_string());

        cmd
    }

    fn resource_commands(
        &self,
        ctx: &BuildContext,
        script: &Path,
        res_file: &Path,
        object: &Path,
    ) -> (CommandSpec, CommandSpec) {
        // Both passes read the script; the second emits COFF directly.
        (
            Self::windres_pass(ctx, "res", script, res_file),
            Self::windres_pass(ctx, "coff", script, object),
        )
    }

    fn link_command(&self, ctx: &BuildContext, objects: &[PathBuf]) -> CommandSpec {
        let mut cmd = CommandSpec::new(&ctx.tools.linker);

        if ctx.target.binary_type == BinaryType::Dll {
            cmd = cmd.arg("-shared");
        }

        // Library search paths and configured flags
        cmd = cmd.arg(self.library_dir_flag(&ctx.runtime.lib_dir()));
        cmd = cmd.args(ctx.flags.link.iter().cloned());

        // Output
        cmd = cmd.arg("-o");
        cmd = cmd.arg(ctx.artifact_path.display().to_string());

        // Object files
        for obj in objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        // Libraries come last so the objects' references resolve
        cmd = cmd.arg(self.library_flag(&ctx.runtime.library));
        for lib in &ctx.flags.libraries {
            cmd = cmd.arg(self.library_flag(lib));
        }

        cmd
    }
}
