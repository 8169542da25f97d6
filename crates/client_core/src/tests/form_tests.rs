use super::*;

fn filled_form() -> RegistrationForm {
    let mut form = RegistrationForm::new();
    form.edit(Field::FirstName, "Ada");
    form.edit(Field::LastName, "Lovelace");
    let ticket = form
        .edit(Field::Email, "ada@example.org")
        .expect("email schedules a check");
    form.edit(Field::Password, "engine1");
    assert!(form.resolve_email_check(ticket.generation, None));
    form
}

#[test]
fn starts_empty_and_editing() {
    let form = RegistrationForm::new();
    let view = form.view();
    assert_eq!(view.phase, UiPhase::Editing);
    assert!(view.sign_up());
    assert!(!view.error());
    assert!(!view.submitted);
    assert_eq!(view.error_message, None);
    for field in Field::ALL {
        let field_view = view.field(field).expect("field present");
        assert_eq!(field_view.value, "");
        assert_eq!(field_view.status, FieldStatus::Invalid);
        assert!(!field_view.dirty);
        assert!(!field_view.touched);
        assert!(!view.show_errors(field));
    }
}

#[test]
fn only_email_edits_schedule_checks() {
    let mut form = RegistrationForm::new();
    assert_eq!(form.edit(Field::FirstName, "Ada"), None);
    assert_eq!(form.edit(Field::Password, "secret"), None);

    let ticket = form.edit(Field::Email, "ada@example.org").expect("ticket");
    assert_eq!(ticket.email, "ada@example.org");
    assert_eq!(form.status(Field::Email), FieldStatus::Pending);
}

#[test]
fn email_check_runs_even_when_pattern_fails() {
    let mut form = RegistrationForm::new();
    let ticket = form.edit(Field::Email, "not-an-email").expect("ticket");
    assert_eq!(form.status(Field::Email), FieldStatus::Invalid);
    assert!(form.resolve_email_check(ticket.generation, None));
    assert_eq!(
        form.errors(Field::Email),
        vec![FieldError::Email, FieldError::Pattern]
    );
}

#[test]
fn exists_verdict_invalidates_email() {
    let mut form = RegistrationForm::new();
    let ticket = form.edit(Field::Email, "taken@example.org").expect("ticket");
    assert!(form.resolve_email_check(ticket.generation, Some(FieldError::Exists)));
    assert_eq!(form.status(Field::Email), FieldStatus::Invalid);
    assert_eq!(form.errors(Field::Email), vec![FieldError::Exists]);
}

#[test]
fn stale_check_result_is_discarded() {
    let mut form = RegistrationForm::new();
    let first = form.edit(Field::Email, "old@example.org").expect("ticket");
    let second = form.edit(Field::Email, "new@example.org").expect("ticket");
    assert!(second.generation > first.generation);

    assert!(!form.resolve_email_check(first.generation, Some(FieldError::Exists)));
    assert_eq!(form.status(Field::Email), FieldStatus::Pending);

    assert!(form.resolve_email_check(second.generation, None));
    assert_eq!(form.status(Field::Email), FieldStatus::Valid);

    // A duplicate delivery for the current ticket does not flip the status.
    assert!(!form.resolve_email_check(second.generation, Some(FieldError::Exists)));
    assert_eq!(form.status(Field::Email), FieldStatus::Valid);
}

#[test]
fn submit_with_empty_fields_is_gated() {
    let mut form = RegistrationForm::new();
    let gate = form.begin_submit();
    assert_eq!(
        gate,
        SubmitGate::Invalid {
            fields: Field::ALL.to_vec()
        }
    );
    assert!(form.submitted());
    assert!(!form.submitting());
    assert!(form.view().show_errors(Field::FirstName));
}

#[test]
fn submit_waits_for_pending_email_check() {
    let mut form = filled_form();
    form.edit(Field::Email, "other@example.org");
    assert_eq!(
        form.begin_submit(),
        SubmitGate::Invalid {
            fields: vec![Field::Email]
        }
    );
}

#[test]
fn ready_submit_carries_all_values() {
    let mut form = filled_form();
    match form.begin_submit() {
        SubmitGate::Ready { data, epoch } => {
            assert_eq!(epoch, 0);
            assert_eq!(data.first_name, "Ada");
            assert_eq!(data.last_name, "Lovelace");
            assert_eq!(data.email, "ada@example.org");
            assert_eq!(data.password, "engine1");
        }
        other => panic!("unexpected gate: {other:?}"),
    }
    assert!(form.submitting());
    assert_eq!(form.begin_submit(), SubmitGate::AlreadyInFlight);
}

#[test]
fn failure_sets_error_phase_and_message() {
    let mut form = filled_form();
    let SubmitGate::Ready { epoch, .. } = form.begin_submit() else {
        panic!("expected ready gate");
    };
    let err = SignupApiError::Rejected {
        status: 400,
        message: "Email taken".into(),
        body: Default::default(),
    };
    assert!(form.complete_submit(epoch, Err(&err)));

    let view = form.view();
    assert_eq!(view.phase, UiPhase::Error);
    assert!(view.error());
    assert!(!view.sign_up());
    assert_eq!(view.error_message.as_deref(), Some("Email taken"));
    assert!(!view.submitting);
}

#[test]
fn malformed_failure_still_yields_message() {
    let mut form = filled_form();
    let SubmitGate::Ready { epoch, .. } = form.begin_submit() else {
        panic!("expected ready gate");
    };
    let err = SignupApiError::MalformedErrorResponse { status: 502 };
    assert!(form.complete_submit(epoch, Err(&err)));
    assert_eq!(form.phase(), UiPhase::Error);
    assert_eq!(form.error_message(), Some("Registration failed (HTTP 502)"));
}

#[test]
fn success_clears_prior_error() {
    let mut form = filled_form();
    let SubmitGate::Ready { epoch, .. } = form.begin_submit() else {
        panic!("expected ready gate");
    };
    let err = SignupApiError::Transport("connection refused".into());
    form.complete_submit(epoch, Err(&err));
    assert!(form.error_message().is_some());

    let SubmitGate::Ready { epoch, .. } = form.begin_submit() else {
        panic!("expected ready gate");
    };
    assert!(form.complete_submit(epoch, Ok(())));
    assert_eq!(form.phase(), UiPhase::Submitted);
    assert_eq!(form.error_message(), None);
}

#[test]
fn reset_restores_initial_state() {
    let mut form = filled_form();
    form.touch(Field::FirstName);
    let SubmitGate::Ready { epoch, .. } = form.begin_submit() else {
        panic!("expected ready gate");
    };
    let err = SignupApiError::Rejected {
        status: 400,
        message: "Email taken".into(),
        body: Default::default(),
    };
    form.complete_submit(epoch, Err(&err));

    form.reset();

    assert_eq!(form.view(), RegistrationForm::new().view());
    assert!(!form.submitted());
    assert_eq!(form.phase(), UiPhase::Editing);
    assert_eq!(form.error_message(), None);
}

#[test]
fn reset_discards_outstanding_responses() {
    let mut form = filled_form();
    let SubmitGate::Ready { epoch, .. } = form.begin_submit() else {
        panic!("expected ready gate");
    };
    let ticket = form.edit(Field::Email, "late@example.org").expect("ticket");

    form.reset();

    assert!(!form.complete_submit(epoch, Ok(())));
    assert!(!form.resolve_email_check(ticket.generation, Some(FieldError::Exists)));
    assert_eq!(form.phase(), UiPhase::Editing);
    assert_eq!(form.status(Field::Email), FieldStatus::Invalid);
    assert_eq!(form.errors(Field::Email), vec![FieldError::Required]);
}

#[test]
fn touched_fields_show_errors_before_submit() {
    let mut form = RegistrationForm::new();
    form.edit(Field::Password, "abc");
    let view = form.view();
    assert!(!view.show_errors(Field::Password));

    form.touch(Field::Password);
    let view = form.view();
    assert!(view.show_errors(Field::Password));
    assert!(view.field(Field::Password).expect("password").dirty);
}
