//! Google OAuth credentials for the Sheets API.
//!
//! A cached `token.json` is reused while valid, refreshed in place when it
//! expires, and created through the installed-app flow when missing.

mod credentials;
mod flow;

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{info, warn};

pub use credentials::{AuthorizedUser, ClientSecrets};
use flow::run_installed_flow;

use crate::config::{CredentialPaths, SHEETS_SCOPE};
use crate::error::AuthError;

pub struct Authenticator {
    http: reqwest::Client,
    user: Mutex<AuthorizedUser>,
    token_path: Option<PathBuf>,
}

impl Authenticator {
    /// Loads, refreshes or creates credentials, saving them when they change.
    pub async fn setup(paths: &CredentialPaths) -> Result<Self, AuthError> {
        let http = reqwest::Client::new();
        let cached = AuthorizedUser::load(&paths.token)?.filter(|user| {
            let covered = user.covers(SHEETS_SCOPE);
            if !covered {
                warn!("cached token lacks the spreadsheets scope, re-authorizing");
            }
            covered
        });

        let user = match cached {
            Some(user) if user.is_valid() => user,
            Some(mut user) if user.refresh_token.is_some() => {
                user.refresh(&http).await?;
                user.save(&paths.token)?;
                user
            }
            _ => {
                info!("Opening Google authorization flow...");
                let secrets = ClientSecrets::load(&paths.client_secrets)?;
                let user = run_installed_flow(&http, &secrets, SHEETS_SCOPE).await?;
                user.save(&paths.token)?;
                user
            }
        };

        Ok(Self {
            http,
            user: Mutex::new(user),
            token_path: Some(paths.token.clone()),
        })
    }

    /// Wraps credentials that are never written back to disk.
    pub fn in_memory(user: AuthorizedUser) -> Self {
        Self {
            http: reqwest::Client::new(),
            user: Mutex::new(user),
            token_path: None,
        }
    }

    /// A bearer token that is valid right now.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut user = self.user.lock().await;
        if !user.is_valid() {
            user.refresh(&self.http).await?;
            if let Some(path) = &self.token_path {
                user.save(path)?;
            }
        }
        Ok(user.token.clone())
    }
}
