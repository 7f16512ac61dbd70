//! `svara` binary entry point.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use svara_auth::FileSessionStore;
use svara_cli::auth_handlers::{PasswordSource, handle_auth_command};
use svara_cli::cli::{Cli, Command};
use svara_cli::client_handlers::{Backends, handle_clients_command};
use svara_cli::config_handlers::handle_config_command;
use svara_cli::logging;
use svara_core::{ConfigManager, SvaraConfig};
use svara_supabase::SupabaseClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Config { action } => {
            handle_config_command(cli.config.as_deref(), action, &mut stdout)?;
        }
        Command::Auth { action } => {
            let (_, client) = connect(cli.config.as_deref())?;
            let stdin = std::io::stdin();
            let mut piped;
            let passwords = if stdin.is_terminal() {
                PasswordSource::Terminal
            } else {
                piped = stdin.lock();
                PasswordSource::Lines(&mut piped)
            };
            handle_auth_command(&client, action, passwords, &mut stdout).await?;
        }
        Command::Clients { action } => {
            let (config, client) = connect(cli.config.as_deref())?;
            let client = Arc::new(client);
            let backends = Backends {
                table: client.clone(),
                objects: client.clone(),
                auth: client,
            };
            handle_clients_command(&backends, &config, action, &mut stdout).await?;
        }
    }
    Ok(())
}

fn connect(config_path: Option<&str>) -> Result<(SvaraConfig, SupabaseClient)> {
    let config = SvaraConfig::load(config_path).context("Failed to load configuration")?;
    let session_path = config
        .session_path()
        .context("No location for the session file, set session.file in the config")?;
    tracing::debug!(path = %session_path.display(), "Session file");
    let store = Arc::new(FileSessionStore::new(session_path));
    let client = SupabaseClient::new(&config, store).context("Invalid Supabase settings")?;
    Ok((config, client))
}
