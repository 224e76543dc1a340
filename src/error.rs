use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("permits API returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sheets API returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid Sheets URL: {0}")]
    Url(String),
    #[error("credentials unavailable: {0}")]
    Auth(#[from] AuthError),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("client secrets file has no 'installed' or 'web' section")]
    MissingClientSection,
    #[error("token is expired and has no refresh token")]
    NoRefreshToken,
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("authorization state mismatch")]
    StateMismatch,
    #[error("authorization redirect carried no code")]
    MissingCode,
    #[error("loopback receiver failed: {0}")]
    Receiver(String),
}

impl AuthError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        AuthError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
