//! Rendering argument vectors as command-line strings.
//!
//! Only needed where a command has to go through the command interpreter,
//! which is when a tool must run after an environment-setup script in the
//! same shell. Arguments are paths and flags; inner quotes are doubled.

use std::sync::LazyLock;

use regex::Regex;

static SAFE_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_\-.+\\/]+$").expect("safe-argument pattern is valid")
});

/// Quote a single argument if needed.
pub fn quote_argument(arg: &str, force: bool) -> String {
    if !force && SAFE_ARGUMENT.is_match(arg) {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\"\""))
    }
}

/// Join arguments into one command-line string.
///
/// An argument made only of letters, digits, `_`, `-`, `.`, `+` and path
/// separators is emitted as-is unless `force` is set. Everything else is
/// wrapped in double quotes with inner double quotes doubled.
pub fn format_command_line<I, S>(args: I, force: bool) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| quote_argument(arg.as_ref(), force))
        .collect::<Vec<_>>()
        .join(" ")
}
