use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ErrorResponse,
    protocol::{CheckUserRequest, CheckUserResponse, SignupRequest},
};
use tracing::debug;
use url::Url;

use crate::{
    config::{parse_api_base_url, SignupSettings},
    error::{SettingsError, SignupApiError},
};

const CHECK_USER_PATH: &str = "check-user";
const SIGNUP_PATH: &str = "signup";

/// Remote signup service as seen by the controller.
#[async_trait]
pub trait SignupApi: Send + Sync {
    async fn check_user(
        &self,
        request: CheckUserRequest,
    ) -> Result<CheckUserResponse, SignupApiError>;
    async fn signup(&self, request: SignupRequest) -> Result<(), SignupApiError>;
}

pub struct HttpSignupApi {
    http: Client,
    check_user_url: Url,
    signup_url: Url,
}

impl HttpSignupApi {
    pub fn new(settings: &SignupSettings) -> Result<Self, SettingsError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(SettingsError::HttpClient)?;
        Self::with_client(http, &settings.api_base_url)
    }

    pub fn with_client(http: Client, api_base_url: &str) -> Result<Self, SettingsError> {
        let base = parse_api_base_url(api_base_url)?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|source| SettingsError::InvalidBaseUrl {
                    value: api_base_url.to_string(),
                    source,
                })
        };
        Ok(Self {
            check_user_url: join(CHECK_USER_PATH)?,
            signup_url: join(SIGNUP_PATH)?,
            http,
        })
    }
}

#[async_trait]
impl SignupApi for HttpSignupApi {
    async fn check_user(
        &self,
        request: CheckUserRequest,
    ) -> Result<CheckUserResponse, SignupApiError> {
        let body: CheckUserResponse = self
            .http
            .post(self.check_user_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }

    async fn signup(&self, request: SignupRequest) -> Result<(), SignupApiError> {
        let res = self
            .http
            .post(self.signup_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let status = status.as_u16();
        let raw = res.bytes().await?;
        Err(classify_signup_failure(status, &raw))
    }
}

/// Maps a non-success signup body onto the typed failure schema. A body
/// without a usable first error message is a handled malformed response.
pub(crate) fn classify_signup_failure(status: u16, raw: &[u8]) -> SignupApiError {
    let body = match serde_json::from_slice::<ErrorResponse>(raw) {
        Ok(body) => body,
        Err(err) => {
            debug!(status, error = %err, "signup failure body is not an error list");
            return SignupApiError::MalformedErrorResponse { status };
        }
    };

    match body.first_message() {
        Some(message) => SignupApiError::Rejected {
            status,
            message: message.to_string(),
            body,
        },
        None => SignupApiError::MalformedErrorResponse { status },
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
