//! Command handlers for the `firc` CLI.
//!
//! Each submodule implements one command. The `*_source` functions do the
//! work on an in-memory string and return a report; the `*_file` wrappers
//! read the file, print the report and exit non-zero on failure.

use fir_scanner::{DelimiterPolicy, OverflowPolicy, ScannerConfig, SourceBuffer};

mod lex;
mod verify;

pub use lex::{lex_file, lex_source, LexReport};
pub use verify::{verify_file, verify_source, VerifyReport};

/// Options shared by every command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Print the serialized scanner state after each token.
    pub states: bool,
    pub config: ScannerConfig,
}

/// Parse the flags following the file argument.
///
/// # Errors
///
/// Returns a message naming the first unrecognized argument.
pub fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    for arg in args {
        match arg.as_str() {
            "--states" => options.states = true,
            "--lenient" => {
                options.config = options.config.with_delimiters(DelimiterPolicy::Lenient);
            }
            "--truncate" => {
                options.config = options.config.with_overflow(OverflowPolicy::Truncate);
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }
    Ok(options)
}

/// Read a file to a string, exiting with a message on failure.
pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// One warning line per encoding issue in `buf`.
fn encoding_warnings(buf: &SourceBuffer) -> Vec<String> {
    buf.encoding_issues()
        .iter()
        .map(|issue| format!("warning: {} at byte {}", issue.kind.describe(), issue.pos))
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
