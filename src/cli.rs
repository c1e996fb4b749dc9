use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Debugging and development CLI for showcase content
#[derive(Parser)]
#[command(name = "showcase")]
#[command(about = "Inspect media classification and stored profile content", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./showcase.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the platform tag for pasted text
    Classify {
        /// URL or iframe snippet
        input: String,
    },
    /// Print the embeddable reference for pasted text
    Normalize {
        /// URL or iframe snippet
        input: String,
        /// Force a platform instead of classifying
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Print the content document as a visitor would see it
    Show {
        /// Wallet address; omit for the anonymous document
        #[arg(short, long)]
        address: Option<String>,
        /// Print the raw stored document instead (nothing if none stored)
        #[arg(long)]
        raw: bool,
    },
    /// Delete the stored document for an identity
    Clear {
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List stored identity keys
    Keys,
}
