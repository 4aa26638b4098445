use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scenery::error::InterpretError;
use scenery::interpret;

/// scenery interprets a small declarative language describing nested 2D
/// scene graphs and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program file to interpret. Reads stdin when omitted.
    file: Option<PathBuf>,

    /// Interpret the given source text instead of a file.
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,

    /// Print compact JSON instead of pretty JSON.
    #[arg(long)]
    compact: bool,
}

/// Install the log subscriber, only if RUST_LOG is set. Logs go to stderr so
/// stdout stays pure JSON.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_source(args: &Args) -> io::Result<String> {
    if let Some(source) = &args.eval {
        return Ok(source.clone());
    }
    match &args.file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Print the offending source line with a caret under the error column.
fn report(source: &str, err: &InterpretError) {
    let normalized = source.replace("\r\n", "\n");
    let line_text = normalized
        .split(['\n', '\r'])
        .nth(err.line().saturating_sub(1))
        .unwrap_or("");

    eprintln!("ERROR AT LINE {}:", err.line());
    eprintln!("{}", line_text);
    eprintln!("{}^", " ".repeat(err.column().saturating_sub(1)));
    eprintln!("{}", err.message);
    eprintln!();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let source = match read_source(&args) {
        Ok(source) => source,
        Err(e) => {
            match &args.file {
                Some(path) => eprintln!("Failed to read '{}': {}", path.display(), e),
                None => eprintln!("Failed to read stdin: {}", e),
            }
            return ExitCode::from(2);
        }
    };

    let output = interpret(&source);
    if args.compact {
        println!("{}", output.to_json());
    } else {
        println!("{}", output.to_json_pretty());
    }

    match &output.error {
        Some(err) => {
            report(&source, err);
            ExitCode::from(1)
        }
        None => ExitCode::SUCCESS,
    }
}
