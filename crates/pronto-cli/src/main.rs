mod db;
mod list;
mod logos;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::list::ListArgs;

#[derive(Debug, Parser)]
#[command(name = "pronto-cli")]
#[command(about = "Pronto restaurant deals command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Filter, sort and print the restaurant listing
    List(ListArgs),
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Restaurant logo cache
    Logos {
        #[command(subcommand)]
        command: LogosCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Insert restaurants and their deals from a CSV file
    ImportCsv {
        /// CSV file with a header row
        path: PathBuf,
        /// Resolve street addresses through the geocoder before importing
        #[arg(long)]
        geocode: bool,
    },
}

#[derive(Debug, Subcommand)]
enum LogosCommands {
    /// Download every restaurant logo that is not cached yet
    Download {
        /// Read restaurants from this CSV instead of the configured source
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Cache directory; defaults to PRONTO_LOGO_DIR
        #[arg(long)]
        logo_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::List(args)) => list::run_list(&args).await?,
        Some(Commands::Db { command }) => match command {
            DbCommands::Ping => db::run_db_ping().await?,
            DbCommands::Migrate => db::run_db_migrate().await?,
            DbCommands::ImportCsv { path, geocode } => db::run_import_csv(&path, geocode).await?,
        },
        Some(Commands::Logos {
            command: LogosCommands::Download { csv, logo_dir },
        }) => logos::run_logos_download(csv.as_deref(), logo_dir.as_deref()).await?,
        None => println!("pronto-cli ready; run with --help for commands"),
    }

    Ok(())
}
