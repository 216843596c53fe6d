//! # protospark CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use protospark_cli::codec::{run_decode, run_encode, DecodeArgs, EncodeArgs};
use protospark_cli::peek::{run_peek, PeekArgs};
use protospark_cli::types::{run_types, TypesArgs};

/// Protospark CLI
///
/// Inspects proto3 schema documents and moves JSON records to and from the
/// binary encoding, including predictive envelopes that carry their own
/// encrypted type tag.
#[derive(Parser, Debug)]
#[command(name = "protospark", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Cipher configuration file (YAML or JSON) for envelope tags.
    #[arg(long, global = true)]
    cipher_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the messages in schema documents.
    Types(TypesArgs),

    /// Encode a JSON record.
    Encode(EncodeArgs),

    /// Decode bytes into a JSON record.
    Decode(DecodeArgs),

    /// Print the type name carried by a predictive envelope.
    Peek(PeekArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "protospark CLI starting");

    let cipher_config = cli.cipher_config.as_deref();
    let result = match cli.command {
        Commands::Types(args) => run_types(&args),
        Commands::Encode(args) => run_encode(&args, cipher_config),
        Commands::Decode(args) => run_decode(&args, cipher_config),
        Commands::Peek(args) => run_peek(&args, cipher_config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
