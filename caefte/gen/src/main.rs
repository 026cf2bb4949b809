//! caefte contract compiler
//!
//! Reads a Rust service module and writes either the server dispatcher
//! (`.rs` destination) or the Elm client module (any other destination).

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use caefte_gen::config::{
    DEFAULT_CLIENT_MODULE, DEFAULT_GET_MARKER, DEFAULT_MODULE_ROOT, DEFAULT_POST_MARKER,
    GeneratorConfig,
};
use caefte_gen::output::generate_and_write;

/// caefte-gen - generates a server dispatcher or a client module from
/// route-marked service methods
#[derive(Parser, Debug)]
#[command(name = "caefte-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rust source file declaring the service types
    module: PathBuf,

    /// Output file; `.rs` receives the server dispatcher, anything else the
    /// Elm client
    destination: PathBuf,

    /// Rust path of the service module as seen from the generated server
    /// module
    #[arg(long, default_value = DEFAULT_MODULE_ROOT)]
    module_root: String,

    /// Name of the generated Elm module
    #[arg(long, default_value = DEFAULT_CLIENT_MODULE)]
    client_module: String,

    /// Attribute name marking GET endpoints
    #[arg(long, default_value = DEFAULT_GET_MARKER)]
    get_marker: String,

    /// Attribute name marking POST endpoints
    #[arg(long, default_value = DEFAULT_POST_MARKER)]
    post_marker: String,

    /// Print the generated artifact instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            get_marker: self.get_marker.clone(),
            post_marker: self.post_marker.clone(),
            module_root: self.module_root.clone(),
            client_module: self.client_module.clone(),
        }
    }
}

/// Initialize tracing subscriber writing to stderr.
///
/// `RUST_LOG` wins when set. Otherwise:
/// - 0 (default): WARN only
/// - 1 (-v): INFO (source, destination, endpoint counts)
/// - 2 (-vv): DEBUG (skipped markers, discovered endpoints)
/// - 3+ (-vvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,caefte_gen=info".to_string(),
            2 => "info,caefte_gen=debug".to_string(),
            _ => "debug,caefte_gen=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Prints clap's help, version or usage error and picks the exit code.
///
/// Help and version go to stdout and succeed unless that write fails; a
/// failed write leaves no stream to report on, so only the exit code says so.
fn report_parse_outcome(e: &clap::Error) -> ExitCode {
    let informational = matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
    match e.print() {
        Ok(()) if informational => ExitCode::SUCCESS,
        Ok(()) | Err(_) => ExitCode::from(1),
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return report_parse_outcome(&e),
    };

    init_tracing(cli.verbose);

    match generate_and_write(&cli.module, &cli.destination, &cli.config(), cli.dry_run) {
        Ok(code) => {
            if cli.dry_run {
                let mut stdout = io::stdout().lock();
                if let Err(e) = stdout.write_all(code.as_bytes()) {
                    eprintln!("Error: failed to write to stdout: {}", e);
                    return ExitCode::from(2);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
