//! Folio: admin CLI for the marketing site's content.
//!
//! # Usage
//!
//! ```text
//! folio init [--site-name <name>] [--seed]
//! folio show <portfolio|pricing|services> [--json]
//! folio replace <kind> <file> [--dry-run]
//! folio seed [<kind>]
//! folio home show|set
//! folio why show|set <file>
//! folio render <route> [--etag]
//! folio daemon start|stop|status
//! ```
//!
//! Writes go through the daemon when it is running so its page cache is
//! invalidated; otherwise the content store is opened directly.

mod backend;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    daemon::DaemonCommand,
    init::InitArgs,
    render::RenderArgs,
    replace::ReplaceArgs,
    seed::SeedArgs,
    show::ShowArgs,
    singleton::{HomeCommand, WhyCommand},
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "Edit portfolio, pricing and services content for the marketing site",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.folio/config.yaml.
    Init(InitArgs),

    /// List the records of a collection.
    Show(ShowArgs),

    /// Replace a whole collection with the records in a YAML or JSON file.
    Replace(ReplaceArgs),

    /// Store default content in empty collections.
    Seed(SeedArgs),

    /// Show or patch the home page hero.
    Home {
        #[command(subcommand)]
        command: HomeCommand,
    },

    /// Show or patch the "why choose us" section.
    Why {
        #[command(subcommand)]
        command: WhyCommand,
    },

    /// Render a public page to stdout.
    Render(RenderArgs),

    /// Run or control the content daemon.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Replace(args) => args.run(),
        Commands::Seed(args) => args.run(),
        Commands::Home { command } => commands::singleton::run_home(command),
        Commands::Why { command } => commands::singleton::run_why(command),
        Commands::Render(args) => args.run(),
        Commands::Daemon { command } => commands::daemon::run(command),
    }
}

/// Library logs go to stderr only when `FOLIO_LOG` or `RUST_LOG` asks for them.
fn init_logging() {
    if std::env::var_os("FOLIO_LOG").is_some() {
        let _ = env_logger::Builder::from_env(env_logger::Env::new().filter("FOLIO_LOG")).try_init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        let _ = env_logger::try_init();
    }
}
