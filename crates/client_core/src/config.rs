use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use shared::domain::CampaignUuid;
use url::Url;
use uuid::Uuid;

use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_FILE: &str = "signup.toml";
const DEFAULT_API_BASE_URL: &str = "https://api.raisely.com/v3/";
const DEFAULT_CAMPAIGN_UUID: Uuid = Uuid::from_u128(0x46aa3270_d2ee_11ea_a9f0_e9a68ccff42a);
const DEFAULT_CHECK_DEBOUNCE: Duration = Duration::from_millis(500);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a failed uniqueness check does to the email field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckFailurePolicy {
    /// Treat the failure as "no conflict"; submission stays possible.
    #[default]
    FailOpen,
    /// Mark the email invalid until it is edited again.
    Block,
}

impl FromStr for CheckFailurePolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_open" | "fail-open" | "open" => Ok(Self::FailOpen),
            "block" => Ok(Self::Block),
            _ => Err(SettingsError::InvalidValue {
                key: "check_failure_policy",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupSettings {
    pub api_base_url: String,
    pub campaign_uuid: CampaignUuid,
    pub check_debounce: Duration,
    pub request_timeout: Duration,
    pub check_failure_policy: CheckFailurePolicy,
}

impl Default for SignupSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            campaign_uuid: CampaignUuid(DEFAULT_CAMPAIGN_UUID),
            check_debounce: DEFAULT_CHECK_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            check_failure_policy: CheckFailurePolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    api_base_url: Option<String>,
    campaign_uuid: Option<String>,
    check_debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    check_failure_policy: Option<CheckFailurePolicy>,
}

/// Layers defaults, the settings file and environment overrides.
///
/// An explicit `path` must exist; without one, `signup.toml` in the working
/// directory is read when present.
pub fn load_settings(path: Option<&Path>) -> Result<SignupSettings, SettingsError> {
    let mut settings = SignupSettings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        apply_file(&mut settings, &raw, &path)?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    parse_api_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file(settings: &mut SignupSettings, raw: &str, path: &Path) -> Result<(), SettingsError> {
    let file: SettingsFile = toml::from_str(raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(v) = file.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file.campaign_uuid {
        settings.campaign_uuid = v.parse()?;
    }
    if let Some(v) = file.check_debounce_ms {
        settings.check_debounce = Duration::from_millis(v);
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file.check_failure_policy {
        settings.check_failure_policy = v;
    }
    Ok(())
}

pub(crate) fn apply_env_overrides(
    settings: &mut SignupSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), SettingsError> {
    if let Some(v) = lookup("SIGNUP_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("SIGNUP_CAMPAIGN_UUID") {
        settings.campaign_uuid = v.parse()?;
    }
    if let Some(v) = lookup("APP__CAMPAIGN_UUID") {
        settings.campaign_uuid = v.parse()?;
    }

    if let Some(v) = lookup("APP__CHECK_DEBOUNCE_MS") {
        let ms = parse_number("check_debounce_ms", &v)?;
        settings.check_debounce = Duration::from_millis(ms);
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        let secs = parse_number("request_timeout_secs", &v)?;
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(v) = lookup("APP__CHECK_FAILURE_POLICY") {
        settings.check_failure_policy = v.parse()?;
    }

    Ok(())
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}

/// Parses the base url and guarantees a trailing slash so that endpoint
/// paths are joined below it instead of replacing its last segment.
pub fn parse_api_base_url(raw: &str) -> Result<Url, SettingsError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| SettingsError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
