//! autonom - meal-ordering workflow host.
//!
//! Entry point for the API server, the catalog service and profile tooling.

mod cli;
mod cmd_profile;
mod server;

use clap::Parser;

use autonom_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::cmd_profile::handle_profile_command;
use crate::server::{init_tracing, run_catalog, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_validated(&cli.config)?;
    init_tracing(&config.logging)?;
    for warning in ConfigValidator::validate(&config).warnings {
        tracing::warn!(path = %warning.path, "{}", warning.message);
    }

    match cli.command {
        None => run_server(config, None, None).await,
        Some(Commands::Run { host, port }) => run_server(config, host, port).await,
        Some(Commands::Catalog { host, port }) => run_catalog(config, host, port).await,
        Some(Commands::Profile { action }) => handle_profile_command(action, &config).await,
    }
}
