//! VC-class driver (Microsoft Visual C++ and Windows SDK tools).

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::context::BuildContext;
use crate::builder::executor::Invocation;
use crate::core::target::BinaryType;

use super::{CommandSpec, ToolchainClass, ToolchainDriver};

/// Microsoft-style driver: `cl` compiles, `link` links, `rc` and `cvtres`
/// turn resource scripts into objects.
///
/// The tools read their configuration from environment variables that only
/// the setup script (`vcvars32.bat`, `SetEnv.Cmd`) knows how to set, so
/// every tool runs in the same shell as that script.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsvcDriver;

impl MsvcDriver {
    fn tool(path: &Option<PathBuf>, fallback: &str) -> PathBuf {
        path.clone().unwrap_or_else(|| PathBuf::from(fallback))
    }
}

impl ToolchainDriver for MsvcDriver {
    fn class(&self) -> ToolchainClass {
        ToolchainClass::Vc
    }

    fn include_flag(&self, dir: &Path) -> String {
        format!("-I{}", dir.display())
    }

    fn library_dir_flag(&self, dir: &Path) -> String {
        format!("/LIBPATH:{}", dir.display())
    }

    fn library_flag(&self, name: &str) -> String {
        format!("{}.lib", name)
    }

    fn compile_command(&self, ctx: &BuildContext, source: &Path, object: &Path) -> CommandSpec {
        let mut cmd = CommandSpec::new(&ctx.tools.compiler);

        cmd = cmd.arg("/c");
        cmd = cmd.arg(self.include_flag(&ctx.runtime.include_dir()));
        cmd = cmd.args(ctx.flags.compile.iter().cloned());

        // One debug database per object keeps sources independent.
        cmd = cmd.arg(format!("/Fo{}", object.display()));
        cmd = cmd.arg(format!("/Fd{}", object.with_extension("pdb").display()));

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
        let rc = CommandSpec::new(Self::tool(&ctx.tools.resource_compiler, "rc"))
            .arg("/fo")
            .arg(res_file.display().to_string())
            .arg(script.display().to_string());

        let cvtres = CommandSpec::new(Self::tool(&ctx.tools.resource_converter, "cvtres"))
            .args(ctx.flags.resource.iter().cloned())
            .arg(format!("/OUT:{}", object.display()))
            .arg(res_file.display().to_string());

        (rc, cvtres)
    }

    fn link_command(&self, ctx: &BuildContext, objects: &[PathBuf]) -> CommandSpec {
        let mut cmd = CommandSpec::new(&ctx.tools.linker);

        if ctx.target.binary_type == BinaryType::Dll {
            cmd = cmd.arg("/DLL");
        }

        cmd = cmd.arg(self.library_dir_flag(&ctx.runtime.lib_dir()));
        cmd = cmd.args(ctx.flags.link.iter().cloned());

        cmd = cmd.arg(format!("/OUT:{}", ctx.artifact_path.display()));

        for obj in objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        cmd = cmd.arg(self.library_flag(&ctx.runtime.library));
        for lib in &ctx.flags.libraries {
            cmd = cmd.arg(self.library_flag(lib));
        }

        cmd
    }

    fn invocation(&self, ctx: &BuildContext, spec: CommandSpec) -> Invocation {
        if ctx.setup.is_empty() {
            Invocation::Direct(spec)
        } else {
            Invocation::chained(&ctx.setup, &spec)
        }
    }

    fn check_tools(&self, ctx: &BuildContext) -> Result<()> {
        if ctx.resources.is_empty() {
            return Ok(());
        }
        if ctx.tools.resource_compiler.is_none() {
            bail!(
                "compiler `{}` has no `rc` configured for {}",
                ctx.target.compiler,
                ctx.target.architecture
            );
        }
        if ctx.tools.resource_converter.is_none() {
            bail!(
                "compiler `{}` has no `cvtres` configured for {}",
                ctx.target.compiler,
                ctx.target.architecture
            );
        }
        Ok(())
    }
}
