//! Registration form state: field values, derived validity and UI phase.
//!
//! Everything here is synchronous. The controller owns one form behind a
//! lock and feeds it edits, check results and signup responses; the form only
//! decides whether each of those is still current.

use shared::{domain::Field, protocol::SignupData};

use crate::{
    error::SignupApiError,
    validation::{config_for, validate, FieldError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Valid,
    Invalid,
    Pending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UiPhase {
    #[default]
    Editing,
    Submitted,
    Error,
}

#[derive(Debug, Clone, Default)]
struct FieldState {
    value: String,
    errors: Vec<FieldError>,
    remote_error: Option<FieldError>,
    pending: bool,
    dirty: bool,
    touched: bool,
}

impl FieldState {
    fn new(field: Field) -> Self {
        Self {
            errors: validate(field, ""),
            ..Self::default()
        }
    }

    fn status(&self) -> FieldStatus {
        if !self.errors.is_empty() || self.remote_error.is_some() {
            FieldStatus::Invalid
        } else if self.pending {
            FieldStatus::Pending
        } else {
            FieldStatus::Valid
        }
    }

    fn all_errors(&self) -> Vec<FieldError> {
        self.errors
            .iter()
            .cloned()
            .chain(self.remote_error.clone())
            .collect()
    }
}

/// A uniqueness check scheduled by an email edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCheckTicket {
    pub generation: u64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitGate {
    Ready { data: SignupData, epoch: u64 },
    AlreadyInFlight,
    Invalid { fields: Vec<Field> },
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    fields: [FieldState; 4],
    submitted: bool,
    phase: UiPhase,
    error_message: Option<String>,
    submitting: bool,
    email_generation: u64,
    epoch: u64,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self {
            fields: Field::ALL.map(FieldState::new),
            submitted: false,
            phase: UiPhase::Editing,
            error_message: None,
            submitting: false,
            email_generation: 0,
            epoch: 0,
        }
    }

    fn state(&self, field: Field) -> &FieldState {
        &self.fields[field_index(field)]
    }

    fn state_mut(&mut self, field: Field) -> &mut FieldState {
        &mut self.fields[field_index(field)]
    }

    /// Applies an edit and re-runs the synchronous rules. For fields with a
    /// remote check, returns the ticket the new value must be checked under;
    /// any earlier ticket becomes stale.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) -> Option<EmailCheckTicket> {
        let value = value.into();
        let async_check = config_for(field).async_check;
        let state = self.state_mut(field);
        state.errors = validate(field, &value);
        state.value = value;
        state.dirty = true;

        if !async_check {
            return None;
        }

        state.remote_error = None;
        state.pending = true;
        let email = state.value.clone();
        self.email_generation += 1;
        Some(EmailCheckTicket {
            generation: self.email_generation,
            email,
        })
    }

    pub fn touch(&mut self, field: Field) {
        self.state_mut(field).touched = true;
    }

    /// Records the outcome of a uniqueness check. Returns `false`, leaving the
    /// field untouched, when the ticket was superseded by a later edit or reset.
    pub fn resolve_email_check(&mut self, generation: u64, verdict: Option<FieldError>) -> bool {
        if generation != self.email_generation {
            return false;
        }
        let state = self.state_mut(Field::Email);
        if !state.pending {
            return false;
        }
        state.pending = false;
        state.remote_error = verdict;
        true
    }

    pub fn email_generation(&self) -> u64 {
        self.email_generation
    }

    pub fn value(&self, field: Field) -> &str {
        &self.state(field).value
    }

    pub fn status(&self, field: Field) -> FieldStatus {
        self.state(field).status()
    }

    pub fn errors(&self, field: Field) -> Vec<FieldError> {
        self.state(field).all_errors()
    }

    /// All fields synchronously valid and the email check resolved without
    /// a failure.
    pub fn is_valid(&self) -> bool {
        self.invalid_fields().is_empty()
    }

    fn invalid_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.status(*field) != FieldStatus::Valid)
            .collect()
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn phase(&self) -> UiPhase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// Marks a submit attempt and decides whether a signup request may go out.
    pub fn begin_submit(&mut self) -> SubmitGate {
        self.submitted = true;

        if self.submitting {
            return SubmitGate::AlreadyInFlight;
        }

        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            return SubmitGate::Invalid { fields: invalid };
        }

        self.submitting = true;
        SubmitGate::Ready {
            data: SignupData {
                first_name: self.value(Field::FirstName).to_string(),
                last_name: self.value(Field::LastName).to_string(),
                email: self.value(Field::Email).to_string(),
                password: self.value(Field::Password).to_string(),
            },
            epoch: self.epoch,
        }
    }

    /// Applies a signup response. Responses for a submit issued before the
    /// last reset are ignored and `false` is returned.
    pub fn complete_submit(&mut self, epoch: u64, result: Result<(), &SignupApiError>) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                self.phase = UiPhase::Submitted;
                self.error_message = None;
            }
            Err(err) => {
                self.phase = UiPhase::Error;
                self.error_message = Some(err.user_message());
            }
        }
        true
    }

    /// Back to a pristine, untouched, empty form. Outstanding checks and
    /// signup responses are invalidated.
    pub fn reset(&mut self) {
        self.fields = Field::ALL.map(FieldState::new);
        self.submitted = false;
        self.phase = UiPhase::Editing;
        self.error_message = None;
        self.submitting = false;
        self.email_generation += 1;
        self.epoch += 1;
    }

    pub fn view(&self) -> FormView {
        FormView {
            fields: Field::ALL
                .into_iter()
                .map(|field| {
                    let state = self.state(field);
                    FieldView {
                        field,
                        value: state.value.clone(),
                        status: state.status(),
                        errors: state.all_errors(),
                        dirty: state.dirty,
                        touched: state.touched,
                    }
                })
                .collect(),
            submitted: self.submitted,
            phase: self.phase,
            error_message: self.error_message.clone(),
            submitting: self.submitting,
        }
    }
}

fn field_index(field: Field) -> usize {
    match field {
        Field::FirstName => 0,
        Field::LastName => 1,
        Field::Email => 2,
        Field::Password => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: Field,
    pub value: String,
    pub status: FieldStatus,
    pub errors: Vec<FieldError>,
    pub dirty: bool,
    pub touched: bool,
}

/// Snapshot handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub submitted: bool,
    pub phase: UiPhase,
    pub error_message: Option<String>,
    pub submitting: bool,
}

impl FormView {
    pub fn field(&self, field: Field) -> Option<&FieldView> {
        self.fields.iter().find(|view| view.field == field)
    }

    /// Editing panel visible.
    pub fn sign_up(&self) -> bool {
        self.phase == UiPhase::Editing
    }

    /// Error panel visible.
    pub fn error(&self) -> bool {
        self.phase == UiPhase::Error
    }

    /// Inline errors are shown once the user submitted or left the field.
    pub fn show_errors(&self, field: Field) -> bool {
        let Some(view) = self.field(field) else {
            return false;
        };
        (self.submitted || view.touched) && !view.errors.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
