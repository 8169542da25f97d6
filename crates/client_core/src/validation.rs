//! Synchronous field rules and the per-field rule table.

use std::fmt;

use email_address::{EmailAddress, Options};
use shared::domain::Field;

pub const PASSWORD_MIN_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    /// RFC 5322 address with a top-level domain.
    Email,
    EmailPattern,
    MinLength(usize),
}

impl Rule {
    /// Only `Required` looks at empty values; the other rules stay silent
    /// until something has been typed.
    fn check(self, value: &str) -> Option<FieldError> {
        match self {
            Rule::Required => value.is_empty().then_some(FieldError::Required),
            Rule::Email => {
                (!value.is_empty() && !is_email_address(value)).then_some(FieldError::Email)
            }
            Rule::EmailPattern => {
                (!value.is_empty() && !is_email_shape(value)).then_some(FieldError::Pattern)
            }
            Rule::MinLength(required) => {
                let actual = value.chars().count();
                (actual > 0 && actual < required)
                    .then_some(FieldError::MinLength { required, actual })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldConfig {
    pub field: Field,
    pub rules: &'static [Rule],
    /// Whether the field is additionally checked against the remote service.
    pub async_check: bool,
}

pub const FIELD_CONFIGS: [FieldConfig; 4] = [
    FieldConfig {
        field: Field::FirstName,
        rules: &[Rule::Required],
        async_check: false,
    },
    FieldConfig {
        field: Field::LastName,
        rules: &[Rule::Required],
        async_check: false,
    },
    FieldConfig {
        field: Field::Email,
        rules: &[Rule::Required, Rule::Email, Rule::EmailPattern],
        async_check: true,
    },
    FieldConfig {
        field: Field::Password,
        rules: &[Rule::Required, Rule::MinLength(PASSWORD_MIN_LENGTH)],
        async_check: false,
    },
];

pub fn config_for(field: Field) -> &'static FieldConfig {
    match field {
        Field::FirstName => &FIELD_CONFIGS[0],
        Field::LastName => &FIELD_CONFIGS[1],
        Field::Email => &FIELD_CONFIGS[2],
        Field::Password => &FIELD_CONFIGS[3],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    Email,
    Pattern,
    MinLength { required: usize, actual: usize },
    /// The remote service already knows this email.
    Exists,
    /// The uniqueness check failed and the policy blocks on failure.
    CheckUnavailable,
}

impl FieldError {
    pub fn key(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::Email => "email",
            FieldError::Pattern => "pattern",
            FieldError::MinLength { .. } => "minlength",
            FieldError::Exists => "exists",
            FieldError::CheckUnavailable => "check_unavailable",
        }
    }

    pub fn message(&self, field: Field) -> String {
        match self {
            FieldError::Required => format!("{} is required", field.label()),
            FieldError::Email | FieldError::Pattern => {
                format!("{} must be a valid email address", field.label())
            }
            FieldError::MinLength { required, .. } => {
                format!("{} must be at least {required} characters", field.label())
            }
            FieldError::Exists => "Email already exists".to_string(),
            FieldError::CheckUnavailable => {
                "Unable to verify this email right now; edit it to retry".to_string()
            }
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Runs every synchronous rule configured for `field`, in table order.
pub fn validate(field: Field, value: &str) -> Vec<FieldError> {
    config_for(field)
        .rules
        .iter()
        .filter_map(|rule| rule.check(value))
        .collect()
}

/// Parses the address and requires every domain label to be a hostname
/// label: non-empty, no leading or trailing hyphen.
pub fn is_email_address(value: &str) -> bool {
    if EmailAddress::parse_with_options(value, Options::default().with_required_tld()).is_err() {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    let local_ok = local.split('.').all(|part| !part.is_empty());
    let domain_ok = domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));
    local_ok && domain_ok
}

/// Case-insensitive `^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,4}$`.
pub fn is_email_shape(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'));
    let tld_ok = (2..=4).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
