//! fabric-ids CLI
//!
//! Crawls the Microsoft Fabric REST API reference with headless Chrome and
//! reports which Microsoft Entra identity types each endpoint supports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fabric_ids::menu::{run_menu, MenuArgs};
use fabric_ids::scrape::{run_scrape, ScrapeArgs};
use tracing::Level;

#[derive(Parser)]
#[command(name = "fabric-ids")]
#[command(version)]
#[command(about = "Fabric REST API identity support scraper with headless Chrome")]
#[command(long_about = "Reads the Microsoft Entra supported identities table of every Fabric REST API endpoint.\n\nCommands:\n  menu     Print the API navigation menu\n  scrape   Build the identity support matrix and write it to CSV")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the text of every entry in the API navigation menu
    Menu(MenuArgs),
    /// Crawl every endpoint page and export identity support to CSV
    Scrape(ScrapeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match cli.command {
        Commands::Menu(args) => run_menu(args).await,
        Commands::Scrape(args) => run_scrape(args).await,
    }
}
