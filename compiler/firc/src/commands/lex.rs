//! The `lex` command: dump the token stream of a file.

use fir_scanner::{Driver, PermissivePolicy, ScanError, Scanner, SourceBuffer, Token};

use super::{encoding_warnings, read_file, CliOptions};

/// Result of lexing one source text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexReport {
    /// One line per token.
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
    /// The error that stopped the scan, if any.
    pub error: Option<ScanError>,
}

/// Lex `source` with [`PermissivePolicy`] and render each token.
///
/// Lines have the form `Kind @ start..end "text"`, followed by
/// ` state=<hex>` when [`CliOptions::states`] is set.
pub fn lex_source(source: &str, options: CliOptions) -> LexReport {
    let buf = SourceBuffer::new(source);
    let mut report = LexReport {
        warnings: encoding_warnings(&buf),
        ..LexReport::default()
    };

    let scanner = Scanner::with_config(options.config);
    let mut driver = Driver::new(scanner, buf.cursor(), PermissivePolicy::new());
    while let Some(result) = driver.next() {
        match result {
            Ok(token) => {
                let text = driver.cursor().slice(token.span.start, token.span.end);
                let mut line = render(token, text);
                if options.states {
                    line.push_str(" state=");
                    push_hex(&mut line, &driver.scanner().snapshot());
                }
                report.lines.push(line);
            }
            Err(err) => report.error = Some(err),
        }
    }
    report
}

fn render(token: Token, text: &str) -> String {
    format!("{:?} @ {} {text:?}", token.kind, token.span)
}

fn push_hex(out: &mut String, bytes: &[u8]) {
    out.extend(bytes.iter().map(|byte| format!("{byte:02x}")));
}

/// Lex a file and print its tokens, exiting with status 1 on a scan error.
pub fn lex_file(path: &str, options: CliOptions) {
    let content = read_file(path);
    let report = lex_source(&content, options);
    for warning in &report.warnings {
        eprintln!("{path}: {warning}");
    }
    for line in &report.lines {
        println!("{line}");
    }
    if let Some(err) = report.error {
        eprintln!("{path}: error: {err}");
        std::process::exit(1);
    }
}
