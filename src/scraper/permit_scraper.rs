use crate::error::FetchError;
use crate::models::RawPermit;
use tracing::{error, info};

pub struct PermitScraper {
    base_url: String,
    app_token: Option<String>,
    client: reqwest::Client,
}

impl PermitScraper {
    pub fn new(base_url: impl Into<String>, app_token: Option<String>) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: base_url.into(),
            app_token,
            client: reqwest::Client::builder()
                .user_agent(concat!("permit-sheets-sync/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
        })
    }

    /// Fetches permits, logging any failure and yielding no records for it.
    pub async fn fetch_permits(&self, filters: &[(String, String)]) -> Vec<RawPermit> {
        match self.try_fetch_permits(filters).await {
            Ok(permits) => permits,
            Err(e) => {
                error!(error = %e, "error fetching permits");
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_permits(
        &self,
        filters: &[(String, String)],
    ) -> Result<Vec<RawPermit>, FetchError> {
        info!(url = %self.base_url, ?filters, "fetching permits");

        let mut request = self.client.get(&self.base_url).query(filters);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let permits: Vec<RawPermit> = serde_json::from_str(&body)?;

        info!(count = permits.len(), bytes = body.len(), "fetched permits");
        Ok(permits)
    }
}
