//! Failure reporting for external commands.
//!
//! Build logs are meant to be read by a person. When a tool fails, the exact
//! command line and everything the tool printed are dumped between separator
//! lines so the block can be found and copied out of a long log.

use std::io::{self, Write};

/// Width of the separator lines around a failure block.
pub const SEPARATOR_WIDTH: usize = 80;

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Render the diagnostic block for a failed command.
pub fn failure_block(command: &str, output: &str) -> String {
    let sep = separator();
    let mut block = String::with_capacity(command.len() + output.len() + 4 * SEPARATOR_WIDTH);

    block.push_str(&sep);
    block.push('\n');
    block.push_str(&format!("cmd = {}\n", command));
    block.push_str(&sep);
    block.push('\n');
    block.push_str(output);
    if !output.is_empty() && !output.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&sep);
    block.push('\n');

    block
}

/// Print the diagnostic block for a failed command to stdout.
pub fn emit_failure(command: &str, output: &str) {
    let mut stdout = io::stdout().lock();
    // Nothing sensible to do if stdout is gone.
    let _ = stdout.write_all(failure_block(command, output).as_bytes());
    let _ = stdout.flush();
}
