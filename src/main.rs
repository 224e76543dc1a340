mod auth;
mod config;
mod error;
mod models;
mod pipeline;
mod scraper;
mod sheets;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::auth::Authenticator;
use crate::config::{Config, CredentialPaths};
use crate::pipeline::{fetch_timestamp, process_permits, CycleOutcome, PermitSync};
use crate::scraper::PermitScraper;
use crate::sheets::SheetsClient;

#[derive(Parser)]
#[command(name = "permit-sheets-sync")]
#[command(about = "Sync Seattle construction permits into a Google Sheet")]
struct Cli {
    #[command(flatten)]
    opts: Opts,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Opts {
    /// Destination spreadsheet id
    #[arg(long, env = "SPREADSHEET_ID", global = true)]
    spreadsheet_id: Option<String>,
    /// Query filter as key=value; replaces the default filters when given
    #[arg(short, long = "filter", global = true)]
    filters: Vec<String>,
    /// Seconds between polling cycles
    #[arg(long, env = "PERMIT_SYNC_INTERVAL", default_value_t = config::UPDATE_INTERVAL_SECS, global = true)]
    interval: u64,
    #[arg(long, env = "PERMITS_API_URL", default_value = config::PERMITS_API_URL, global = true)]
    permits_url: String,
    #[arg(long, env = "SOCRATA_APP_TOKEN", global = true)]
    app_token: Option<String>,
    #[arg(long, env = "WORKSHEET_NAME", default_value = config::WORKSHEET_NAME, global = true)]
    worksheet: String,
    /// OAuth client secrets downloaded from the Google console
    #[arg(long, env = "GOOGLE_CLIENT_SECRETS", default_value = config::CLIENT_SECRETS_PATH, global = true)]
    credentials: PathBuf,
    /// Cached user token, refreshed in place
    #[arg(long, env = "GOOGLE_TOKEN_PATH", default_value = config::TOKEN_PATH, global = true)]
    token: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll on the update interval and write each batch to the sheet (default)
    Run,
    /// Run a single fetch-process-write cycle
    Once,
    /// Fetch and process permits without touching the sheet
    Fetch {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Authorize Google Sheets access and save the token
    Authorize,
}

impl Opts {
    fn into_config(self) -> Result<Config> {
        let config = Config {
            permits_url: self.permits_url,
            app_token: self.app_token,
            spreadsheet_id: self.spreadsheet_id,
            worksheet: self.worksheet,
            credentials: CredentialPaths {
                client_secrets: self.credentials,
                token: self.token,
            },
            ..Config::default()
        }
        .with_interval_secs(self.interval)?
        .with_filter_overrides(&self.filters)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.opts.into_config()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let sync = build_sync(&config).await?;
            sync.run(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("could not write startup message to Google Sheets")?;
        }
        Commands::Once => {
            let sync = build_sync(&config).await?;
            match sync.run_cycle().await {
                CycleOutcome::Written(n) => info!(count = n, "cycle complete"),
                CycleOutcome::Empty => info!("cycle complete, nothing to write"),
                CycleOutcome::WriteFailed => anyhow::bail!("sheet update failed"),
            }
        }
        Commands::Fetch { output } => {
            let scraper = PermitScraper::new(&config.permits_url, config.app_token.clone())?;
            let permits = scraper
                .try_fetch_permits(&config.filters)
                .await
                .context("fetching permits")?;
            let table = process_permits(&permits, &config.fields, &fetch_timestamp(Local::now()));
            let json = serde_json::to_string_pretty(&table)?;

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, json)?;
                    info!(count = table.len(), path = %path.display(), "permits saved");
                }
                None => println!("{json}"),
            }
        }
        Commands::Authorize => {
            let auth = Authenticator::setup(&config.credentials)
                .await
                .context("Google authorization failed")?;
            auth.access_token().await?;
            info!(path = %config.credentials.token.display(), "token ready");
        }
    }

    Ok(())
}

async fn build_sync(config: &Config) -> Result<PermitSync> {
    let spreadsheet_id = config.spreadsheet_id()?;
    let auth = Authenticator::setup(&config.credentials)
        .await
        .context("Google authorization failed")?;
    let scraper = PermitScraper::new(&config.permits_url, config.app_token.clone())?;
    let sheets = SheetsClient::new(&config.sheets_url, spreadsheet_id, &config.worksheet, auth);

    Ok(PermitSync::new(
        scraper,
        sheets,
        config.filters.clone(),
        config.fields.clone(),
        config.interval,
    ))
}
