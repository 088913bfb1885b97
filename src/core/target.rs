//! Build target descriptors.
//!
//! A [`TargetDescriptor`] is the full set of choices that determines one
//! build: which compiler, which CPU architecture, debug or release, the kind
//! of binary, and the runtime version the binary links against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::config::{BuildConfig, DefaultTarget};

/// CPU architecture of the produced binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
}

impl Architecture {
    /// All supported architectures.
    pub const ALL: [Architecture; 2] = [Architecture::X86, Architecture::X64];

    /// Get the architecture key as used in tokens and tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Architecture::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("invalid architecture '{}'; expected 'x86' or 'x64'", s))
    }
}

/// Build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Debug,
    Release,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Debug, Mode::Release];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Debug => "debug",
            Mode::Release => "release",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("invalid mode '{}'; expected 'debug' or 'release'", s))
    }
}

/// Kind of binary to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryType {
    /// A standalone executable (`.exe`)
    #[default]
    Application,
    /// A dynamic library (`.dll`)
    Dll,
}

impl BinaryType {
    pub const ALL: [BinaryType; 2] = [BinaryType::Application, BinaryType::Dll];

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryType::Application => "application",
            BinaryType::Dll => "dll",
        }
    }

    /// File extension of the final artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            BinaryType::Application => "exe",
            BinaryType::Dll => "dll",
        }
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BinaryType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("invalid binary type '{}'; expected 'application' or 'dll'", s))
    }
}

/// The tuple of choices that fully determines one build.
///
/// `compiler` and `runtime` are keys into the configuration tables; they are
/// only known to be meaningful after [`validate`](crate::core::validate::validate)
/// has accepted the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TargetDescriptor {
    pub compiler: String,
    pub architecture: Architecture,
    pub mode: Mode,
    #[serde(rename = "type")]
    pub binary_type: BinaryType,
    pub runtime: String,
}

impl TargetDescriptor {
    /// Create a descriptor from configured defaults.
    pub fn from_defaults(defaults: &DefaultTarget) -> Self {
        TargetDescriptor {
            compiler: defaults.compiler.to_lowercase(),
            architecture: defaults.architecture,
            mode: defaults.mode,
            binary_type: defaults.binary_type,
            runtime: defaults.runtime.to_lowercase(),
        }
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} (runtime {})",
            self.compiler, self.architecture, self.mode, self.binary_type, self.runtime
        )
    }
}

/// A target descriptor plus the post-build actions requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: TargetDescriptor,
    /// Run the artifact with `--version` after a successful build.
    pub run_after: bool,
}

/// Token that requests a smoke run of the built artifact.
pub const RUN_TOKEN: &str = "run";

impl BuildRequest {
    /// Parse a flat, order-independent token list.
    ///
    /// Tokens are matched case-insensitively against, in order: the runtime
    /// prefix followed by a configured runtime key, a mode, a configured
    /// compiler key, an architecture, a binary type, and `run`. Later tokens
    /// override earlier ones. Anything else is ignored.
    pub fn parse<I, S>(config: &BuildConfig, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut target = TargetDescriptor::from_defaults(&config.defaults);
        let mut run_after = false;
        let prefix = config.project.runtime_prefix.to_lowercase();

        for token in tokens {
            let token = token.as_ref().to_lowercase();

            if let Some(version) = token
                .strip_prefix(prefix.as_str())
                .filter(|v| config.runtimes.contains_key(*v))
            {
                target.runtime = version.to_string();
            } else if let Ok(mode) = token.parse::<Mode>() {
                target.mode = mode;
            } else if config.compilers.contains_key(&token) {
                target.compiler = token;
            } else if let Ok(arch) = token.parse::<Architecture>() {
                target.architecture = arch;
            } else if let Ok(ty) = token.parse::<BinaryType>() {
                target.binary_type = ty;
            } else if token == RUN_TOKEN {
                run_after = true;
            } else {
                tracing::debug!("ignoring unrecognized token `{}`", token);
            }
        }

        BuildRequest { target, run_after }
    }
}
