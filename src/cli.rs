//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::reports::Cadence;

/// Domainfolio - periodic portfolio reports for domain owners
#[derive(Parser, Debug)]
#[command(name = "domainfolio")]
#[command(version)]
#[command(about = "Periodic portfolio report dispatcher for domain owners", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Run one report dispatch in-process
    ///
    /// Without --cadence only the cadences due at --at (default: now) are sent.
    Dispatch {
        /// Wall-clock instant to dispatch for (RFC3339 or epoch millis)
        #[arg(long)]
        at: Option<String>,

        /// Force the given cadences regardless of time (repeatable)
        #[arg(long = "cadence", value_name = "CADENCE")]
        cadences: Vec<Cadence>,
    },

    /// Print one user's report without sending it
    Preview {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Report cadence
        #[arg(long, default_value = "daily")]
        cadence: Cadence,

        /// Wall-clock instant the report ends at (RFC3339 or epoch millis)
        #[arg(long)]
        at: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate a sample configuration file
    Generate {
        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}
