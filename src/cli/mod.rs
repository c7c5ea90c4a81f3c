//! Command-line interface for wp2vite
//!
//! Subcommands:
//! - `migrate`: Rewrite a webpack project to build with Vite
//! - `inspect`: Print what would be migrated, without writing

mod inspect;
mod migrate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

pub use inspect::InspectCommand;
pub use migrate::MigrateCommand;

/// wp2vite - Move webpack projects (CRA, react-app-rewired, Vue CLI) to Vite
#[derive(Parser, Debug)]
#[command(name = "wp2vite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to wp2vite.toml settings file, relative to the project root
    #[arg(short, long, global = true, default_value = crate::config::SETTINGS_FILE)]
    pub settings: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate a project to Vite
    Migrate(MigrateCommand),

    /// Show the detected project profile and the Vite description
    Inspect(InspectCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        print_banner();

        match &self.command {
            Commands::Migrate(cmd) => cmd.execute(&self.settings).await,
            Commands::Inspect(cmd) => cmd.execute(&self.settings).await,
        }
    }
}

/// Print the wp2vite banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "⚡".cyan(),
        "wp2vite".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
