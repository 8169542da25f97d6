//! Submission controller: drives the form from user actions, debounces the
//! email uniqueness check and posts the signup request.

use std::sync::{Arc, Weak};

use shared::{
    domain::Field,
    protocol::{CheckUserData, CheckUserRequest, SignupRequest},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    api::SignupApi,
    config::{CheckFailurePolicy, SignupSettings},
    error::SignupApiError,
    form::{EmailCheckTicket, FieldStatus, FormView, RegistrationForm, SubmitGate},
    validation::FieldError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    EmailCheckResolved {
        email: String,
        status: FieldStatus,
    },
    SignedUp,
    SignupFailed {
        message: String,
    },
    Reset,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The gate refused the submit; no request was sent.
    Invalid { fields: Vec<Field> },
    /// A signup request is still outstanding; no request was sent.
    AlreadyInFlight,
    SignedUp,
    Failed {
        message: String,
        error: SignupApiError,
    },
    /// The form was reset while the request was outstanding.
    Discarded,
}

pub struct RegistrationController {
    api: Arc<dyn SignupApi>,
    settings: SignupSettings,
    form: Mutex<RegistrationForm>,
    email_check: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<FormEvent>,
}

impl RegistrationController {
    pub fn new(api: Arc<dyn SignupApi>, settings: SignupSettings) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            api,
            settings,
            form: Mutex::new(RegistrationForm::new()),
            email_check: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> FormView {
        self.form.lock().await.view()
    }

    /// Applies an edit. An email edit replaces whatever check was scheduled
    /// or running with a new one for the new value.
    pub async fn set_field(self: &Arc<Self>, field: Field, value: impl Into<String>) {
        // Slot before form: the slot must always hold the task of the newest ticket.
        let mut slot = self.email_check.lock().await;
        let Some(ticket) = self.form.lock().await.edit(field, value) else {
            return;
        };
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        debug!(generation = ticket.generation, "scheduling email uniqueness check");
        let this = Arc::downgrade(self);
        let debounce = self.settings.check_debounce;
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            run_email_check(this, ticket).await;
        }));
    }

    pub async fn touch(&self, field: Field) {
        self.form.lock().await.touch(field);
    }

    async fn check_email(&self, ticket: EmailCheckTicket) {
        let request = CheckUserRequest::new(
            self.settings.campaign_uuid,
            CheckUserData {
                email: ticket.email.clone(),
            },
        );

        let verdict = match self.api.check_user(request).await {
            Ok(res) if res.exists() => Some(FieldError::Exists),
            Ok(_) => None,
            Err(err) => {
                warn!(
                    generation = ticket.generation,
                    error = %err,
                    policy = ?self.settings.check_failure_policy,
                    "email uniqueness check failed"
                );
                match self.settings.check_failure_policy {
                    CheckFailurePolicy::FailOpen => None,
                    CheckFailurePolicy::Block => Some(FieldError::CheckUnavailable),
                }
            }
        };

        let status = {
            let mut form = self.form.lock().await;
            if !form.resolve_email_check(ticket.generation, verdict) {
                debug!(
                    generation = ticket.generation,
                    current = form.email_generation(),
                    "discarding stale email check result"
                );
                return;
            }
            form.status(Field::Email)
        };

        debug!(generation = ticket.generation, ?status, "email check resolved");
        let _ = self.events.send(FormEvent::EmailCheckResolved {
            email: ticket.email,
            status,
        });
    }

    /// Validation-gated signup. Only one signup request is outstanding at a
    /// time.
    pub async fn submit(&self) -> SubmitOutcome {
        let gate = self.form.lock().await.begin_submit();
        let (data, epoch) = match gate {
            SubmitGate::Ready { data, epoch } => (data, epoch),
            SubmitGate::AlreadyInFlight => {
                debug!("submit ignored; signup request already outstanding");
                return SubmitOutcome::AlreadyInFlight;
            }
            SubmitGate::Invalid { fields } => {
                debug!(?fields, "submit blocked by invalid fields");
                return SubmitOutcome::Invalid { fields };
            }
        };

        let request = SignupRequest::new(self.settings.campaign_uuid, data);
        let result = self.api.signup(request).await;

        let phase = {
            let mut form = self.form.lock().await;
            if !form.complete_submit(epoch, result.as_ref().map(|_| ())) {
                debug!("discarding signup response received after reset");
                return SubmitOutcome::Discarded;
            }
            form.phase()
        };

        match result {
            Ok(()) => {
                info!(?phase, "signup succeeded");
                let _ = self.events.send(FormEvent::SignedUp);
                SubmitOutcome::SignedUp
            }
            Err(error) => {
                let message = error.user_message();
                warn!(?phase, error = %error, "signup failed");
                let _ = self.events.send(FormEvent::SignupFailed {
                    message: message.clone(),
                });
                SubmitOutcome::Failed { message, error }
            }
        }
    }

    pub async fn reset(&self) {
        let mut slot = self.email_check.lock().await;
        if let Some(pending) = slot.take() {
            pending.abort();
        }
        self.form.lock().await.reset();
        drop(slot);
        let _ = self.events.send(FormEvent::Reset);
    }
}

async fn run_email_check(controller: Weak<RegistrationController>, ticket: EmailCheckTicket) {
    let Some(controller) = controller.upgrade() else {
        return;
    };
    controller.check_email(ticket).await;
}

impl Drop for RegistrationController {
    fn drop(&mut self) {
        if let Some(pending) = self.email_check.get_mut().take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
