//! Fir scanner CLI
//!
//! Dumps token streams and checks snapshot/resume behavior.

use firc::commands::{lex_file, parse_options, verify_file, CliOptions};

fn main() {
    firc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: firc lex <file.fir> [--states] [--lenient] [--truncate]");
                std::process::exit(1);
            }
            let options = options_or_exit(&args[3..]);
            lex_file(&args[2], options);
        }
        "verify" => {
            if args.len() < 3 {
                eprintln!("Usage: firc verify <file.fir> [--lenient] [--truncate]");
                std::process::exit(1);
            }
            let options = options_or_exit(&args[3..]);
            verify_file(&args[2], options.config);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Fir scanner {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn options_or_exit(args: &[String]) -> CliOptions {
    match parse_options(args) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Fir scanner");
    println!();
    println!("Usage: firc <command> [options]");
    println!();
    println!("Commands:");
    println!("  lex <file.fir>       Tokenize and display tokens");
    println!("  verify <file.fir>    Resume from every saved state and compare");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --states            Print the serialized state after each token (lex)");
    println!("  --lenient           Accept closers that do not match the open frame");
    println!("  --truncate          Drop pushes past the nesting limit instead of failing");
    println!();
    println!("Set RUST_LOG=fir_scanner=trace to log every scan call.");
}
