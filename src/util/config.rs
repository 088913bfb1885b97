//! Configuration file support for multibuild.
//!
//! A project is described by `Multibuild.toml` at its root: the artifact
//! name, the source and resource lists, the directory layout, the default
//! target, and the tables of known compilers and runtime versions.
//!
//! Compiler and runtime tables may also live in a global overlay at
//! `~/.multibuild/toolchains.toml`. Entries in the project file take
//! precedence over global entries with the same key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::ToolchainClass;
use crate::core::target::{Architecture, BinaryType, Mode};

/// Project configuration file name.
pub const CONFIG_FILE_NAME: &str = "Multibuild.toml";

/// Global toolchain overlay file name.
pub const GLOBAL_TOOLCHAINS_FILE_NAME: &str = "toolchains.toml";

/// Complete build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Project root all relative directories resolve against
    #[serde(skip)]
    pub root: PathBuf,

    /// Project settings
    pub project: ProjectConfig,

    /// Target used when no token overrides a field
    pub defaults: DefaultTarget,

    /// Known compilers, keyed by the token that selects them
    pub compilers: BTreeMap<String, CompilerConfig>,

    /// Known runtime versions, keyed by version
    pub runtimes: BTreeMap<String, RuntimeConfig>,
}

/// Project-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Base name of the produced artifact
    pub name: String,

    /// Prefix of runtime tokens and tags (`py` makes `py3` select runtime `3`)
    pub runtime_prefix: String,

    /// Source files relative to the source directory (globs allowed)
    pub sources: Vec<String>,

    /// Resource scripts relative to the resource directory (globs allowed)
    pub resources: Vec<String>,

    /// Directory layout
    pub directories: ProjectDirectories,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: "pyp".to_string(),
            runtime_prefix: "py".to_string(),
            sources: Vec::new(),
            resources: Vec::new(),
            directories: ProjectDirectories::default(),
        }
    }
}

/// Directory names relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDirectories {
    pub src: PathBuf,
    pub res: PathBuf,
    pub obj: PathBuf,
    pub bin: PathBuf,
}

impl Default for ProjectDirectories {
    fn default() -> Self {
        ProjectDirectories {
            src: PathBuf::from("src"),
            res: PathBuf::from("res"),
            obj: PathBuf::from("obj"),
            bin: PathBuf::from("bin"),
        }
    }
}

/// Absolute project directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub src: PathBuf,
    pub res: PathBuf,
    pub obj: PathBuf,
    pub bin: PathBuf,
}

/// Default target descriptor values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTarget {
    pub compiler: String,
    pub architecture: Architecture,
    pub mode: Mode,
    #[serde(rename = "type")]
    pub binary_type: BinaryType,
    pub runtime: String,
}

impl Default for DefaultTarget {
    fn default() -> Self {
        DefaultTarget {
            compiler: "gcc".to_string(),
            architecture: Architecture::X86,
            mode: Mode::Debug,
            binary_type: BinaryType::Application,
            runtime: "2".to_string(),
        }
    }
}

/// A list of flags per build mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeFlags {
    pub debug: Vec<String>,
    pub release: Vec<String>,
}

impl ModeFlags {
    /// Flags for the given mode.
    pub fn get(&self, mode: Mode) -> &[String] {
        match mode {
            Mode::Debug => &self.debug,
            Mode::Release => &self.release,
        }
    }
}

/// Flag categories shared by compiler-wide and architecture-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagTable {
    pub compiler_flags: ModeFlags,
    pub linker_flags: ModeFlags,
    /// Library base names, without `-l` or `.lib`
    pub linker_libraries: ModeFlags,
    /// Flags for the resource-to-object converter (`cvtres`)
    #[serde(alias = "cvtres_flags")]
    pub resource_flags: ModeFlags,
}

/// Values present on both architectures, or just one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerArchitecture<T> {
    pub x86: Option<T>,
    pub x64: Option<T>,
}

impl<T> Default for PerArchitecture<T> {
    fn default() -> Self {
        PerArchitecture { x86: None, x64: None }
    }
}

impl<T> PerArchitecture<T> {
    pub fn get(&self, arch: Architecture) -> Option<&T> {
        match arch {
            Architecture::X86 => self.x86.as_ref(),
            Architecture::X64 => self.x64.as_ref(),
        }
    }

    pub fn contains(&self, arch: Architecture) -> bool {
        self.get(arch).is_some()
    }

    /// Architectures that have an entry.
    pub fn architectures(&self) -> Vec<Architecture> {
        Architecture::ALL
            .into_iter()
            .filter(|arch| self.contains(*arch))
            .collect()
    }
}

/// A compiler family entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Which driver handles this compiler
    pub class: ToolchainClass,

    /// Flags applied on every architecture
    #[serde(default)]
    pub flags: FlagTable,

    /// Tools and extra flags per architecture
    #[serde(default)]
    pub architectures: PerArchitecture<ArchitectureToolset>,
}

/// Tools for one compiler on one architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureToolset {
    pub compiler: PathBuf,
    pub linker: PathBuf,

    /// `windres` for GCC-class, `rc` for VC-class
    #[serde(default, alias = "windres", alias = "rc")]
    pub resource_compiler: Option<PathBuf>,

    /// `cvtres` (VC-class only)
    #[serde(default, alias = "cvtres")]
    pub resource_converter: Option<PathBuf>,

    /// Environment setup command run before every tool, per mode
    #[serde(default)]
    pub setup: ModeFlags,

    /// Flags appended after the compiler-wide flags
    #[serde(default)]
    pub flags: FlagTable,
}

/// A runtime version entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub architectures: PerArchitecture<RuntimeInstall>,
}

/// Where a runtime is installed for one architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInstall {
    /// Install root containing `include/` and `libs/`
    pub path: PathBuf,
    /// Link library base name (e.g. `python27`)
    pub library: String,
}

impl RuntimeInstall {
    pub fn include_dir(&self) -> PathBuf {
        self.path.join("include")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.path.join("libs")
    }
}

/// The compiler and runtime tables on their own, as stored in the global overlay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainTables {
    pub compilers: BTreeMap<String, CompilerConfig>,
    pub runtimes: BTreeMap<String, RuntimeConfig>,
}

impl ToolchainTables {
    /// Load the tables from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read toolchain config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse toolchain config: {}", path.display()))
    }

    /// Load the tables, falling back to empty tables if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to load toolchain config from {}: {:#}",
                    path.display(),
                    e
                );
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

impl BuildConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(contents: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: BuildConfig = toml::from_str(contents)?;
        config.root = root.into();
        config.normalize_keys();
        Ok(config)
    }

    /// Load configuration from a file. The root is set to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::parse(&contents, root)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge compiler and runtime tables underneath this config.
    ///
    /// Keys already present in this config are kept.
    pub fn merge_underneath(&mut self, tables: ToolchainTables) {
        for (key, compiler) in tables.compilers {
            self.compilers.entry(key.to_lowercase()).or_insert(compiler);
        }
        for (key, runtime) in tables.runtimes {
            self.runtimes.entry(key.to_lowercase()).or_insert(runtime);
        }
    }

    /// Absolute project directories.
    pub fn layout(&self) -> ProjectLayout {
        let dirs = &self.project.directories;
        ProjectLayout {
            src: self.root.join(&dirs.src),
            res: self.root.join(&dirs.res),
            obj: self.root.join(&dirs.obj),
            bin: self.root.join(&dirs.bin),
        }
    }

    /// Get a compiler entry.
    pub fn compiler(&self, key: &str) -> Option<&CompilerConfig> {
        self.compilers.get(key)
    }

    /// Get a runtime entry.
    pub fn runtime(&self, key: &str) -> Option<&RuntimeConfig> {
        self.runtimes.get(key)
    }

    // Tokens are lower-cased before matching, so keys must be too.
    fn normalize_keys(&mut self) {
        self.compilers = std::mem::take(&mut self.compilers)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self.runtimes = std::mem::take(&mut self.runtimes)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
    }
}

/// Load the project configuration and layer the global toolchain tables under it.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`Multibuild.toml`)
/// 2. Global overlay (`~/.multibuild/toolchains.toml`), if given
pub fn load_config(
    root: &Path,
    project_path: &Path,
    global_path: Option<&Path>,
) -> Result<BuildConfig> {
    let mut config = BuildConfig::load(project_path)?;
    config.root = root.to_path_buf();

    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        tracing::debug!("layering global toolchains from {}", global_path.display());
        config.merge_underneath(ToolchainTables::load_or_default(global_path));
    }

    Ok(config)
}

/// Find `Multibuild.toml` starting from `start` and searching upward.
pub fn find_config(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            bail!(
                "could not find `{}` in `{}` or any parent directory",
                CONFIG_FILE_NAME,
                start.display()
            );
        }
    }
}

/// Get the global multibuild config directory (~/.multibuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".multibuild"))
}

/// Get the global toolchain overlay path (~/.multibuild/toolchains.toml).
pub fn global_toolchains_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(GLOBAL_TOOLCHAINS_FILE_NAME))
}
