//! ROFL command-line tool for checking and listing ROFL documents.
//!
//! Usage: rofl [OPTIONS] [FILE]
//!
//! Options:
//!   --check                Only check the document (print "ok" if valid)
//!   -q, --quiet            Do not emit parse diagnostics
//!   --max-nesting <N>      Maximum object nesting [default: 100]
//!   --max-values <N>       Maximum values per member [default: 100]
//!   --allow-hint <NAME>    Accept only members whose hint is listed (repeatable)
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! Each member is printed on its own line as `Object.Path.name: Hint = values`.

use librofl::{parse_with_options, ParseOptions, Rejection, RejectionKind};
use std::fs;
use std::io::{self, Read, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    let mut options = ParseOptions::new();
    let mut check_only = false;
    let mut allowed_hints: Vec<String> = Vec::new();
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("rofl {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-q" | "--quiet" => {
                options = options.quiet();
            }
            "--check" => {
                check_only = true;
            }
            "--max-nesting" => {
                i += 1;
                options.max_nesting = limit_arg(&args, i, "--max-nesting");
            }
            "--max-values" => {
                i += 1;
                options.max_values = limit_arg(&args, i, "--max-values");
            }
            "--allow-hint" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --allow-hint requires a hint name");
                    process::exit(1);
                }
                allowed_hints.push(args[i].clone());
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    let input = match read_input(input_path) {
        Ok(input) => input,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(1);
        }
    };

    tracing::debug!(
        path = input_path.unwrap_or("<stdin>"),
        bytes = input.len(),
        "parsing"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = list_members(&input, &options, &allowed_hints, check_only, &mut out);
    let _ = out.flush();

    // Parse failures were already reported through tracing unless --quiet.
    process::exit(if result.is_ok() { 0 } else { 1 });
}

/// Install a stderr subscriber. `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Read the numeric argument of a limit option.
fn limit_arg(args: &[String], i: usize, flag: &str) -> usize {
    let Some(raw) = args.get(i) else {
        eprintln!("Error: {} requires a number", flag);
        process::exit(1);
    };
    match raw.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: {} expects a number, got: {}", flag, raw);
            process::exit(1);
        }
    }
}

/// Read the document from a file, or stdin when no path is given.
fn read_input(path: Option<&str>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path, e)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("reading stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

/// Parse `input`, writing one line per member (or `ok` in check mode).
///
/// A non-empty `allowed_hints` rejects members carrying any other hint.
fn list_members<W: Write>(
    input: &str,
    options: &ParseOptions,
    allowed_hints: &[String],
    check_only: bool,
    out: &mut W,
) -> librofl::Result<()> {
    parse_with_options(input, options, |member| {
        if let Some(hint) = member.hint() {
            if !allowed_hints.is_empty() && !allowed_hints.iter().any(|h| h == hint) {
                return Err(Rejection::unexpected_value(format!(
                    "Unknown hint '{}' for member '{}'.",
                    hint,
                    member.name()
                )));
            }
        }
        if check_only {
            return Ok(());
        }
        writeln!(out, "{}", member)
            .map_err(|e| Rejection::new(RejectionKind::Other, format!("write failed: {}", e)))
    })?;

    if check_only {
        let _ = writeln!(out, "ok");
    }
    Ok(())
}

fn print_help() {
    println!(
        r#"rofl - check and list the members of ROFL documents

Usage: rofl [OPTIONS] [FILE]

Arguments:
  [FILE]  Input file (reads from stdin if not provided or if FILE is "-")

Options:
      --check              Only check the document (print "ok" if valid)
  -q, --quiet              Do not emit parse diagnostics
      --max-nesting <N>    Maximum object nesting [default: 100]
      --max-values <N>     Maximum values per member [default: 100]
      --allow-hint <NAME>  Accept only members whose hint is listed (repeatable)
  -h, --help               Print help
  -V, --version            Print version

Each member is printed on its own line as `Object.Path.name: Hint = values`.
Set RUST_LOG to adjust diagnostic verbosity (default: warn)."#
    );
}
