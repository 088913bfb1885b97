//! Build context - everything one pipeline run needs, resolved up front.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::toolchain::ToolchainClass;
use crate::core::artifact::ArtifactDescriptor;
use crate::core::target::{Mode, TargetDescriptor};
use crate::core::validate::resolve_entries;
use crate::util::config::{BuildConfig, FlagTable, RuntimeInstall};
use crate::util::fs::{ensure_dir, expand_inputs};
use crate::util::process::resolve_tool;

/// Tool paths for the selected compiler and architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub compiler: PathBuf,
    pub linker: PathBuf,
    pub resource_compiler: Option<PathBuf>,
    pub resource_converter: Option<PathBuf>,
}

/// Flags for the selected mode, compiler-wide flags first, then
/// architecture-level flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedFlags {
    pub compile: Vec<String>,
    pub link: Vec<String>,
    /// Library base names
    pub libraries: Vec<String>,
    pub resource: Vec<String>,
}

impl MergedFlags {
    /// Concatenate flag tables in order for one mode.
    pub fn merge(tables: &[&FlagTable], mode: Mode) -> Self {
        let mut flags = MergedFlags::default();
        for table in tables {
            flags.compile.extend_from_slice(table.compiler_flags.get(mode));
            flags.link.extend_from_slice(table.linker_flags.get(mode));
            flags.libraries.extend_from_slice(table.linker_libraries.get(mode));
            flags.resource.extend_from_slice(table.resource_flags.get(mode));
        }
        flags
    }
}

/// A fully resolved build of one target.
///
/// Two concurrent builds of the same target share `object_dir`. Nothing
/// guards against that; callers must not run them at the same time.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub target: TargetDescriptor,
    pub artifact: ArtifactDescriptor,
    pub artifact_path: PathBuf,
    pub object_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub src_dir: PathBuf,
    pub res_dir: PathBuf,
    /// Source files relative to `src_dir`
    pub sources: Vec<PathBuf>,
    /// Resource scripts relative to `res_dir`
    pub resources: Vec<PathBuf>,
    pub tools: ResolvedTools,
    /// Setup command for the mode; empty when none is configured
    pub setup: Vec<String>,
    pub flags: MergedFlags,
    pub runtime: RuntimeInstall,
}

impl BuildContext {
    /// Resolve a target against the configuration.
    ///
    /// Performs the same checks as [`validate`](crate::core::validate::validate)
    /// and reads source globs, but creates nothing on disk.
    pub fn resolve(config: &BuildConfig, target: &TargetDescriptor) -> Result<Self> {
        let entries = resolve_entries(config, target)?;
        let layout = config.layout();

        let artifact = ArtifactDescriptor::new(&config.project.runtime_prefix, target);
        let artifact_path = artifact.artifact_path(&layout.bin, &config.project.name);
        let object_dir = artifact.object_dir(&layout.obj);

        let toolset = entries.toolset;
        let setup = toolset.setup.get(target.mode).to_vec();

        // Bare VC tool names are found through the PATH the setup script
        // prepares, not the one multibuild was started with.
        let search_path = !(entries.compiler.class == ToolchainClass::Vc && !setup.is_empty());
        let locate = |path: &Path| {
            if search_path {
                resolve_tool(path)
            } else {
                path.to_path_buf()
            }
        };
        let tools = ResolvedTools {
            compiler: locate(&toolset.compiler),
            linker: locate(&toolset.linker),
            resource_compiler: toolset.resource_compiler.as_deref().map(locate),
            resource_converter: toolset.resource_converter.as_deref().map(locate),
        };

        let flags = MergedFlags::merge(&[&entries.compiler.flags, &toolset.flags], target.mode);

        let sources = expand_inputs(&layout.src, &config.project.sources)?;
        let resources = expand_inputs(&layout.res, &config.project.resources)?;

        Ok(BuildContext {
            target: target.clone(),
            artifact,
            artifact_path,
            object_dir,
            bin_dir: layout.bin,
            src_dir: layout.src,
            res_dir: layout.res,
            sources,
            resources,
            tools,
            setup,
            flags,
            runtime: entries.runtime.clone(),
        })
    }

    /// Create the object and output directories.
    ///
    /// Existing directories are reused as-is.
    pub fn prepare(&self) -> Result<()> {
        ensure_dir(&self.object_dir)?;
        ensure_dir(&self.bin_dir)?;

        // Sources from subdirectories get matching subdirectories of objects.
        for input in self.sources.iter().chain(&self.resources) {
            if let Some(parent) = self.object_path(input, "obj").parent() {
                ensure_dir(parent)?;
            }
        }
        Ok(())
    }

    /// Path of an intermediate file for `input` inside the object directory.
    pub fn object_path(&self, input: &Path, extension: &str) -> PathBuf {
        self.object_dir.join(input).with_extension(extension)
    }

    pub fn source_path(&self, input: &Path) -> PathBuf {
        self.src_dir.join(input)
    }

    pub fn resource_path(&self, input: &Path) -> PathBuf {
        self.res_dir.join(input)
    }

    /// Artifact file stem, for progress lines.
    pub fn artifact_stem(&self) -> String {
        self.artifact_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
