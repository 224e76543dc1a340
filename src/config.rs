use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// Seattle open-data permits dataset
pub const PERMITS_API_URL: &str = "https://data.seattle.gov/resource/76t5-zqzr.json";

/// Fields kept from each permit record, in column order.
pub const PERMIT_FIELDS: &[&str] = &[
    "permitnum",
    "permitclass",
    "permitclassmapped",
    "permittypedesc",
    "description",
    "statuscurrent",
    "originaladdress1",
    "originalcity",
    "originalstate",
    "originalzip",
    "link",
];

/// Column appended to every processed row.
pub const FETCH_DATE_COLUMN: &str = "fetch_date";

pub const DEFAULT_FILTERS: &[(&str, &str)] = &[
    ("permitclass", "Commercial"),
    ("statuscurrent", "Application Accepted"),
];

pub const SPREADSHEET_NAME: &str = "Seattle Construction Permits";
pub const WORKSHEET_NAME: &str = "Active Permits";

// Every 6 hours
pub const UPDATE_INTERVAL_SECS: u64 = 21_600;

pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const CLIENT_SECRETS_PATH: &str = "credentials.json";
pub const TOKEN_PATH: &str = "token.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid filter '{0}', expected key=value")]
    InvalidFilter(String),
    #[error("update interval must be greater than zero")]
    ZeroInterval,
    #[error("SPREADSHEET_ID is not set")]
    MissingSpreadsheetId,
}

/// Where the OAuth client secrets and the cached token live.
#[derive(Debug, Clone)]
pub struct CredentialPaths {
    pub client_secrets: PathBuf,
    pub token: PathBuf,
}

impl Default for CredentialPaths {
    fn default() -> Self {
        Self {
            client_secrets: PathBuf::from(CLIENT_SECRETS_PATH),
            token: PathBuf::from(TOKEN_PATH),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub permits_url: String,
    pub app_token: Option<String>,
    pub filters: Vec<(String, String)>,
    pub fields: Vec<String>,
    pub spreadsheet_id: Option<String>,
    pub worksheet: String,
    pub sheets_url: String,
    pub interval: Duration,
    pub credentials: CredentialPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            permits_url: PERMITS_API_URL.to_string(),
            app_token: None,
            filters: default_filters(),
            fields: PERMIT_FIELDS.iter().map(|f| f.to_string()).collect(),
            spreadsheet_id: None,
            worksheet: WORKSHEET_NAME.to_string(),
            sheets_url: SHEETS_API_URL.to_string(),
            interval: Duration::from_secs(UPDATE_INTERVAL_SECS),
            credentials: CredentialPaths::default(),
        }
    }
}

impl Config {
    pub fn with_interval_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.interval = Duration::from_secs(secs);
        Ok(self)
    }

    /// Replaces the default filters when at least one override is given.
    pub fn with_filter_overrides(mut self, raw: &[String]) -> Result<Self, ConfigError> {
        let overrides = raw
            .iter()
            .map(|s| parse_filter(s))
            .collect::<Result<Vec<_>, _>>()?;
        self.filters = effective_filters(overrides);
        Ok(self)
    }

    pub fn spreadsheet_id(&self) -> Result<&str, ConfigError> {
        self.spreadsheet_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingSpreadsheetId)
    }
}

pub fn default_filters() -> Vec<(String, String)> {
    DEFAULT_FILTERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The overrides if any were supplied, otherwise the default filters.
pub fn effective_filters(overrides: Vec<(String, String)>) -> Vec<(String, String)> {
    if overrides.is_empty() {
        default_filters()
    } else {
        overrides
    }
}

pub fn parse_filter(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidFilter(raw.to_string())),
    }
}
