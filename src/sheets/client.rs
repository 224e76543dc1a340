use std::time::Duration;

use chrono::Local;
use serde_json::json;
use tracing::info;

use crate::auth::Authenticator;
use crate::config::SPREADSHEET_NAME;
use crate::error::SheetsError;
use crate::models::PermitTable;

/// Rows taken by the status banner at the top of the worksheet.
pub const HEADER_ROWS: usize = 7;

/// First cell below the banner; permit data is always written from here.
pub fn data_range(worksheet: &str) -> String {
    format!("{}!A{}", worksheet, HEADER_ROWS + 1)
}

pub fn banner_range(worksheet: &str) -> String {
    format!("{}!A1", worksheet)
}

pub fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    let (n, unit) = if secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if n == 1 {
        format!("Every {unit}")
    } else {
        format!("Every {n} {unit}s")
    }
}

/// The status block written once at startup, exactly `HEADER_ROWS` tall.
pub fn startup_banner(started_at: &str, interval: Duration) -> Vec<Vec<String>> {
    vec![
        vec![format!("{SPREADSHEET_NAME} Sync Status")],
        vec![format!("Scraper started at: {started_at}")],
        vec!["Status: Active".to_string()],
        vec![format!("Update frequency: {}", describe_interval(interval))],
        vec![String::new()],
        vec!["Permit Data will appear below:".to_string()],
        vec![String::new()],
    ]
}

pub struct SheetsClient {
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    auth: Authenticator,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
        auth: Authenticator,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            auth,
            client: reqwest::Client::new(),
        }
    }

    fn values_url(&self, range: &str) -> Result<reqwest::Url, SheetsError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SheetsError::Url(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(self.base_url.clone()))?
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }

    /// Overwrites the cells starting at `range` with `values`.
    pub async fn update_values(
        &self,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let url = self.values_url(range)?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": values,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub async fn write_startup_message(&self, interval: Duration) -> Result<(), SheetsError> {
        let started_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let banner = startup_banner(&started_at, interval);
        self.update_values(&banner_range(&self.worksheet), &banner)
            .await?;
        info!("Successfully wrote startup message to Google Sheets");
        Ok(())
    }

    pub async fn update_permits(&self, table: &PermitTable) -> Result<(), SheetsError> {
        self.update_values(&data_range(&self.worksheet), &table.to_values())
            .await?;
        info!(count = table.len(), "Successfully updated permits to Google Sheets");
        Ok(())
    }
}
