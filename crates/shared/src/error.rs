use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the `errors` list the signup service returns on failure.
///
/// Every member is optional: the service is not trusted to send a complete
/// entry, and a missing message must be reported rather than dereferenced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiErrorEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Option<Vec<ApiErrorEntry>>,
}

impl ErrorResponse {
    pub fn new(errors: Vec<ApiErrorEntry>) -> Self {
        Self {
            errors: Some(errors),
        }
    }

    /// Message of the first error entry, if the body has the expected shape.
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .as_deref()?
            .first()?
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid campaign uuid '{value}': {source}")]
    InvalidCampaignUuid {
        value: String,
        #[source]
        source: uuid::Error,
    },
}
