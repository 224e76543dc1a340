use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tracing::{error, info, warn};

use super::processor::{fetch_timestamp, process_permits};
use crate::error::SheetsError;
use crate::scraper::PermitScraper;
use crate::sheets::SheetsClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing came back, so nothing was written.
    Empty,
    Written(usize),
    WriteFailed,
}

/// Fetch, process and write on a fixed interval.
pub struct PermitSync {
    scraper: PermitScraper,
    sheets: SheetsClient,
    filters: Vec<(String, String)>,
    fields: Vec<String>,
    interval: Duration,
}

impl PermitSync {
    pub fn new(
        scraper: PermitScraper,
        sheets: SheetsClient,
        filters: Vec<(String, String)>,
        fields: Vec<String>,
        interval: Duration,
    ) -> Self {
        Self {
            scraper,
            sheets,
            filters,
            fields,
            interval,
        }
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let permits = self.scraper.fetch_permits(&self.filters).await;
        let fetched_at = fetch_timestamp(Local::now());
        let table = process_permits(&permits, &self.fields, &fetched_at);
        if table.is_empty() {
            info!("no permits returned, skipping sheet update");
            return CycleOutcome::Empty;
        }

        match self.sheets.update_permits(&table).await {
            Ok(()) => CycleOutcome::Written(table.len()),
            Err(e) => {
                error!(error = %e, "error updating Google Sheet");
                CycleOutcome::WriteFailed
            }
        }
    }

    /// Writes the startup banner, then polls until `shutdown` resolves.
    ///
    /// Only a failed banner write is an error; cycle failures are logged.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), SheetsError>
    where
        F: Future<Output = ()>,
    {
        info!("Starting permit sync...");
        if let Err(e) = self.sheets.write_startup_message(self.interval).await {
            error!(error = %e, "Failed to connect to Google Sheets. Check credentials and permissions.");
            return Err(e);
        }
        info!("Successfully connected to Google Sheets!");

        tokio::pin!(shutdown);
        loop {
            info!("Fetching permits at {}", Local::now());
            let outcome = self.run_cycle().await;
            info!(?outcome, "cycle finished");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    warn!("shutdown requested, stopping");
                    return Ok(());
                }
            }
        }
    }
}
