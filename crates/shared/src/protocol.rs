use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::CampaignUuid;

/// Status value the check-user endpoint reports for a registered email.
pub const STATUS_EXISTS: &str = "EXISTS";

/// Envelope shared by every outbound call: the campaign plus a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest<T> {
    pub campaign_uuid: CampaignUuid,
    pub data: T,
}

impl<T> CampaignRequest<T> {
    pub fn new(campaign_uuid: CampaignUuid, data: T) -> Self {
        Self {
            campaign_uuid,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckUserData {
    pub email: String,
}

pub type CheckUserRequest = CampaignRequest<CheckUserData>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckUserStatus {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckUserResponse {
    #[serde(default)]
    pub data: CheckUserStatus,
}

impl CheckUserResponse {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            data: CheckUserStatus {
                status: Some(status.into()),
            },
        }
    }

    pub fn exists(&self) -> bool {
        self.data.status.as_deref() == Some(STATUS_EXISTS)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupData")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub type SignupRequest = CampaignRequest<SignupData>;
