//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Multibuild - build one C project with many Windows toolchains
///
/// Tokens select the target and may appear in any order, case-insensitively:
/// a compiler key (`gcc`, `vc9`, ...), `x86` or `x64`, `debug` or `release`,
/// `application` or `dll`, a runtime (`py2`, `py3`, ...) and `run`.
#[derive(Parser)]
#[command(name = "multibuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target selection tokens
    #[arg(value_name = "TOKENS")]
    pub tokens: Vec<String>,

    /// Project root (defaults to the directory of the config file)
    #[arg(long, env = "MULTIBUILD_ROOT")]
    pub root: Option<PathBuf>,

    /// Path to Multibuild.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the commands as JSON instead of running them
    #[arg(long)]
    pub plan: bool,

    /// Ignore ~/.multibuild/toolchains.toml
    #[arg(long)]
    pub no_global: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
