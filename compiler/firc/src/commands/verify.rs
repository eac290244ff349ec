//! The `verify` command: check that the scanner resumes from every saved
//! state exactly as if it had never stopped.
//!
//! The file is lexed once, recording the serialized state, cursor position
//! and policy before each token. Each checkpoint is then restored into a
//! fresh scanner and the rest of the stream is compared against the
//! uninterrupted run.

use fir_scanner::{
    Driver, PermissivePolicy, ScanError, Scanner, ScannerConfig, SourceBuffer, Token,
};
use tracing::debug;

use super::read_file;

/// Result of a resume check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Tokens in the uninterrupted run.
    pub tokens: usize,
    /// Token indices whose resumed run diverged.
    pub mismatches: Vec<usize>,
    /// Saved states that were restored and replayed.
    pub checkpoints: usize,
    /// The error that stopped the uninterrupted run, if any.
    pub error: Option<ScanError>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

struct Checkpoint {
    state: Vec<u8>,
    pos: u32,
    policy: PermissivePolicy,
}

pub fn verify_source(source: &str, config: ScannerConfig) -> VerifyReport {
    let buf = SourceBuffer::new(source);
    let mut checkpoints = Vec::new();
    let mut stream: Vec<Result<Token, ScanError>> = Vec::new();

    let mut driver = Driver::new(
        Scanner::with_config(config),
        buf.cursor(),
        PermissivePolicy::new(),
    );
    loop {
        checkpoints.push(Checkpoint {
            state: driver.scanner().snapshot(),
            pos: driver.cursor().pos(),
            policy: driver.policy().clone(),
        });
        match driver.next() {
            Some(Ok(token)) => stream.push(Ok(token)),
            // A failed scan commits nothing, so there is no later state.
            Some(Err(err)) => {
                stream.push(Err(err));
                break;
            }
            None => break,
        }
    }

    let mut report = VerifyReport {
        tokens: stream.iter().filter(|r| r.is_ok()).count(),
        checkpoints: checkpoints.len(),
        error: stream.iter().find_map(|r| r.clone().err()),
        ..VerifyReport::default()
    };

    for (index, checkpoint) in checkpoints.into_iter().enumerate() {
        let mut scanner = Scanner::with_config(config);
        if let Err(err) = scanner.deserialize(&checkpoint.state) {
            debug!(index, %err, "checkpoint failed to restore");
            report.mismatches.push(index);
            continue;
        }
        let mut cursor = buf.cursor();
        cursor.reset_to(checkpoint.pos);
        let resumed = Driver::new(scanner, cursor, checkpoint.policy);
        if !resumed.eq(stream[index..].iter().cloned()) {
            debug!(index, pos = checkpoint.pos, "resumed stream diverged");
            report.mismatches.push(index);
        }
    }
    report
}

/// Verify a file, exiting with status 1 if any checkpoint diverges.
pub fn verify_file(path: &str, config: ScannerConfig) {
    let content = read_file(path);
    let report = verify_source(&content, config);
    if let Some(err) = &report.error {
        eprintln!("{path}: note: scan stopped early: {err}");
    }
    if report.is_ok() {
        println!(
            "{path}: {} tokens, resumed from {} checkpoints",
            report.tokens, report.checkpoints
        );
    } else {
        for index in &report.mismatches {
            eprintln!("{path}: resume before token {index} diverged");
        }
        std::process::exit(1);
    }
}
