use std::{io, path::PathBuf};

use shared::error::{DomainError, ErrorResponse};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SignupApiError {
    #[error("failed to reach signup service: {0}")]
    Transport(String),
    #[error("signup service answered with status {status}")]
    ServerStatus { status: u16 },
    #[error("signup service rejected the request with status {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        body: ErrorResponse,
    },
    #[error("signup service returned a malformed error response (status {status})")]
    MalformedErrorResponse { status: u16 },
    #[error("unexpected response body from signup service: {0}")]
    UnexpectedResponse(String),
}

impl SignupApiError {
    /// Single top-level message shown to the user for a failed signup.
    /// Never empty.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::ServerStatus { status } | Self::MalformedErrorResponse { status } => {
                format!("Registration failed (HTTP {status})")
            }
            Self::Transport(_) => "Registration failed: signup service unreachable".to_string(),
            Self::UnexpectedResponse(_) => {
                "Registration failed: unexpected response from signup service".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for SignupApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::ServerStatus {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::UnexpectedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid api base url '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
