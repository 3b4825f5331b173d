//! CLI definitions for autonom.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// autonom CLI.
#[derive(Parser)]
#[command(name = "autonom")]
#[command(about = "Meal-ordering workflow host")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true, env = "AUTONOM_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the workflow API server (default)
    Run {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run the restaurant catalog service
    Catalog {
        /// Override `catalog.host`
        #[arg(long)]
        host: Option<String>,

        /// Override `catalog.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// User profile management
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ProfileAction {
    /// Upsert every profile from a JSON array file
    Import {
        /// Profiles file
        #[arg(default_value = "data/profiles.json")]
        file: PathBuf,
    },

    /// List stored profiles
    List {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}
