//! EmberLog CLI
//!
//! Command-line interface for reading and writing an EmberLog file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use emberlog::store::verify;
use emberlog::{Config, LogStore, SyncStrategy, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// EmberLog CLI
#[derive(Parser, Debug)]
#[command(name = "ember-cli")]
#[command(about = "CLI for the EmberLog append-only key-value store")]
#[command(version)]
struct Args {
    /// Log file
    #[arg(short, long, default_value = "./ember.log")]
    file: String,

    /// Skip fdatasync after each write
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key (int:N, float:X, text:S or plain text)
        key: String,
    },

    /// Append a key-value pair
    Put {
        /// The key (int:N, float:X, text:S or plain text)
        key: String,

        /// The value (int:N, float:X, text:S or plain text)
        value: String,

        /// Seconds since epoch (defaults to now)
        #[arg(short, long)]
        timestamp: Option<u32>,
    },

    /// Replay the log and report its integrity
    Verify,

    /// List live keys
    Keys,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,emberlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> emberlog::Result<()> {
    let command = match args.command {
        Commands::Verify => {
            let stats = verify(&args.file)?;
            println!(
                "ok: {} records, {} live keys, {} superseded, {} bytes",
                stats.records_scanned,
                stats.live_keys,
                stats.superseded_records,
                stats.bytes_scanned
            );
            return Ok(());
        }
        other => other,
    };

    let sync_strategy = if args.no_sync {
        SyncStrategy::FlushOnly
    } else {
        SyncStrategy::EveryWrite
    };
    let config = Config::builder()
        .path(&args.file)
        .sync_strategy(sync_strategy)
        .build();
    let mut store = LogStore::open_with(config)?;

    match command {
        Commands::Get { key } => match store.get(&Value::parse_typed(&key)?)? {
            Some(value) => println!("{}", value),
            None => println!("(absent)"),
        },
        Commands::Put {
            key,
            value,
            timestamp,
        } => {
            let key = Value::parse_typed(&key)?;
            let value = Value::parse_typed(&value)?;
            match timestamp {
                Some(ts) => store.put_at(key, value, ts)?,
                None => store.put(key, value)?,
            }
            println!("OK");
        }
        Commands::Keys => {
            for key in store.keys() {
                println!("{}", key);
            }
        }
        Commands::Verify => {}
    }

    Ok(())
}
