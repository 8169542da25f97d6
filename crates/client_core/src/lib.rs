//! Client-side registration form for campaign signups.
//!
//! [`RegistrationController`] owns the form state, debounces the remote email
//! uniqueness check and posts validated signups through a [`SignupApi`].
//! Rendering layers bind to [`FormView`] snapshots and [`FormEvent`]s.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod validation;

pub use api::{HttpSignupApi, SignupApi};
pub use config::{load_settings, CheckFailurePolicy, SignupSettings};
pub use controller::{FormEvent, RegistrationController, SubmitOutcome};
pub use error::{SettingsError, SignupApiError};
pub use form::{FieldStatus, FieldView, FormView, RegistrationForm, UiPhase};
pub use validation::{validate, FieldError};
