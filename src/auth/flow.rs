use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};
use tracing::info;
use warp::Filter;

use super::credentials::{AuthorizedUser, ClientSecrets};
use crate::error::AuthError;

const DONE_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
    <p>You may close this window.</p></body></html>";

/// Query parameters Google appends to the redirect.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl Redirect {
    fn from_query(mut query: HashMap<String, String>) -> Self {
        Self {
            code: query.remove("code"),
            state: query.remove("state"),
            error: query.remove("error"),
        }
    }

    /// The authorization code, if the redirect belongs to `expected_state` and carries one.
    pub fn into_code(self, expected_state: &str) -> Result<String, AuthError> {
        if let Some(error) = self.error {
            return Err(AuthError::Denied(error));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(AuthError::StateMismatch);
        }
        self.code.ok_or(AuthError::MissingCode)
    }
}

/// One-shot loopback HTTP server that catches the OAuth redirect.
pub struct RedirectReceiver {
    addr: SocketAddr,
    redirects: mpsc::UnboundedReceiver<Redirect>,
    shutdown: Option<oneshot::Sender<()>>,
    server: tokio::task::JoinHandle<()>,
}

impl RedirectReceiver {
    pub fn bind() -> Result<Self, AuthError> {
        let (tx, redirects) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let route = warp::get()
            .and(warp::query::<HashMap<String, String>>())
            .map(move |query: HashMap<String, String>| {
                let _ = tx.send(Redirect::from_query(query));
                warp::reply::html(DONE_PAGE)
            });

        let (addr, server) = warp::serve(route)
            .try_bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                let _ = shutdown_rx.await;
            })
            .map_err(|e| AuthError::Receiver(e.to_string()))?;

        Ok(Self {
            addr,
            redirects,
            shutdown: Some(shutdown_tx),
            server: tokio::spawn(server),
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.addr.port())
    }

    /// Waits for the first redirect, then stops the server.
    pub async fn wait(mut self) -> Result<Redirect, AuthError> {
        let redirect = self
            .redirects
            .recv()
            .await
            .ok_or_else(|| AuthError::Receiver("receiver closed before redirect".into()))?;
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = self.server.await;
        Ok(redirect)
    }
}

pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> Result<reqwest::Url, AuthError> {
    reqwest::Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| AuthError::Receiver(format!("bad auth_uri: {e}")))
}

/// Installed-app flow: the user opens the logged URL and Google redirects back here.
pub async fn run_installed_flow(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    scope: &str,
) -> Result<AuthorizedUser, AuthError> {
    let receiver = RedirectReceiver::bind()?;
    let redirect_uri = receiver.redirect_uri();
    let state = uuid::Uuid::new_v4().simple().to_string();
    let url = authorization_url(secrets, &redirect_uri, scope, &state)?;

    info!("Open this URL in a browser to authorize Google Sheets access:");
    info!("{url}");

    let code = receiver.wait().await?.into_code(&state)?;
    let user = secrets.exchange_code(http, &code, &redirect_uri, scope).await?;
    info!("Authorization complete!");
    Ok(user)
}
