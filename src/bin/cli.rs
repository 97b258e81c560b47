//! RecordKV CLI
//!
//! Inspect and modify a record store file from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use recordkv::{RecordStore, Result, StoreConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// RecordKV CLI
#[derive(Parser, Debug)]
#[command(name = "recordkv-cli")]
#[command(about = "CLI for the RecordKV single-file record store")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "./records.db")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty store file
    Create {
        /// Bytes of index space to reserve up front
        #[arg(long, default_value = "0")]
        index_bytes: u32,
    },

    /// Insert a new record
    Put {
        /// The key to insert
        key: String,

        /// The value to store (as UTF-8 bytes)
        value: String,
    },

    /// Print a record's value
    Get {
        /// The key to read
        key: String,
    },

    /// Replace a record's value
    Update {
        /// The key to update
        key: String,

        /// The new value (as UTF-8 bytes)
        value: String,
    },

    /// Delete a record
    Del {
        /// The key to delete
        key: String,
    },

    /// List keys in index order
    List,

    /// Print layout statistics
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,recordkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Create { index_bytes } => {
            RecordStore::create(&args.file, index_bytes)?.close()?;
            println!("created {}", args.file.display());
        }
        Commands::Put { key, value } => {
            let mut store = RecordStore::open(&args.file)?;
            store.insert(&key, value.as_bytes())?;
            store.close()?;
        }
        Commands::Get { key } => {
            let mut store = RecordStore::open_read_only(&args.file)?;
            let value = store.read(&key)?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        Commands::Update { key, value } => {
            let mut store = RecordStore::open(&args.file)?;
            store.update(&key, value.as_bytes())?;
            store.close()?;
        }
        Commands::Del { key } => {
            let mut store = RecordStore::open(&args.file)?;
            store.delete(&key)?;
            store.close()?;
        }
        Commands::List => {
            let store = RecordStore::open_read_only(&args.file)?;
            for key in store.keys() {
                println!("{}", key);
            }
        }
        Commands::Stats => {
            let config = StoreConfig::builder(&args.file)
                .create_if_missing(false)
                .read_only(true)
                .build();
            let store = RecordStore::open_with(config)?;
            let free = store.free_blocks();
            println!("records:     {}", store.count());
            println!("data start:  {}", store.data_start());
            println!("file length: {}", store.file_len());
            println!("free blocks: {}", free.len());
            println!(
                "free bytes:  {}",
                free.iter().map(|block| block.data_capacity as u64).sum::<u64>()
            );
        }
    }
    Ok(())
}
