//! # taskdesk
//!
//! Command-line client for the taskdesk backend. Wires settings, logging,
//! token storage, the HTTP transport and the task store, then runs one
//! subcommand.

#![deny(unsafe_code)]

mod cli;
mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;

use taskdesk_auth::{FileTokenStore, TokenStore, token_file_path};
use taskdesk_client::{AuthEvent, HttpTaskGateway, Transport, TransportConfig};
use taskdesk_core::logging::init_subscriber;
use taskdesk_query::CacheConfig;
use taskdesk_settings::TaskdeskSettings;
use taskdesk_store::TaskStore;

use crate::cli::Cli;

fn load_settings(cli: &Cli) -> Result<TaskdeskSettings> {
    let mut settings = match &cli.settings {
        Some(path) => taskdesk_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => taskdesk_settings::load_settings().context("Failed to load settings")?,
    };
    if let Some(base_url) = &cli.base_url {
        settings.api.base_url.clone_from(base_url);
    }
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn token_store(settings: &TaskdeskSettings) -> Arc<dyn TokenStore> {
    let path = settings.auth.token_file.as_ref().map_or_else(
        || token_file_path(&taskdesk_settings::loader::data_dir()),
        PathBuf::from,
    );
    Arc::new(FileTokenStore::new(path))
}

/// Print one login hint if the backend rejected the token during the command.
fn report_auth_events(events: &mut broadcast::Receiver<AuthEvent>) {
    let mut login_required = false;
    while let Ok(event) = events.try_recv() {
        match event {
            AuthEvent::LoginRequired { method, path } => {
                tracing::debug!(%method, %path, "login required");
                login_required = true;
            }
        }
    }
    if login_required {
        eprintln!("Your session is no longer valid. Run `taskdesk login --token <TOKEN>`.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    init_subscriber(&settings.logging.level);

    let tokens = token_store(&settings);
    let mut stdout = std::io::stdout().lock();

    if !cli.command.needs_backend() {
        return commands::run_local(&cli.command, tokens.as_ref(), &mut stdout);
    }

    let transport = Arc::new(
        Transport::new(TransportConfig::from_settings(&settings.api), tokens)
            .context("Failed to build HTTP client")?,
    );
    let mut auth_events = transport.subscribe_auth();
    let gateway = Arc::new(HttpTaskGateway::new(transport));
    let store = TaskStore::new(gateway, CacheConfig::from_settings(&settings.cache));

    let result = commands::run_remote(cli.command, &store, &mut stdout).await;
    report_auth_events(&mut auth_events);
    store.shutdown();
    result
}
