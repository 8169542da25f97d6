use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    load_settings, FieldStatus, FormEvent, FormView, HttpSignupApi, RegistrationController,
    SubmitOutcome,
};
use shared::domain::Field;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Register for a campaign through the signup service")]
struct Args {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Settings file; defaults to ./signup.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    check_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    info!(
        api_base_url = %settings.api_base_url,
        campaign = %settings.campaign_uuid,
        "loaded signup settings"
    );
    let api = HttpSignupApi::new(&settings).context("failed to build signup client")?;
    let controller = RegistrationController::new(Arc::new(api), settings);
    let mut events = controller.subscribe_events();

    controller.set_field(Field::FirstName, args.first_name).await;
    controller.set_field(Field::LastName, args.last_name).await;
    controller.set_field(Field::Password, args.password).await;
    controller.set_field(Field::Email, args.email.clone()).await;
    for field in Field::ALL {
        controller.touch(field).await;
    }

    let status = tokio::time::timeout(
        Duration::from_secs(args.check_timeout_secs),
        wait_for_email_check(&mut events),
    )
    .await
    .context("timed out waiting for the email uniqueness check")??;
    info!(?status, "email uniqueness check settled");

    match controller.submit().await {
        SubmitOutcome::SignedUp => {
            println!("Signed up {}", args.email);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Invalid { fields } => {
            print_field_errors(&controller.view().await, &fields);
            Ok(ExitCode::from(2))
        }
        SubmitOutcome::Failed { message, .. } => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::AlreadyInFlight | SubmitOutcome::Discarded => {
            bail!("signup request was superseded before completing")
        }
    }
}

async fn wait_for_email_check(events: &mut broadcast::Receiver<FormEvent>) -> Result<FieldStatus> {
    loop {
        match events.recv().await {
            Ok(FormEvent::EmailCheckResolved { status, .. }) => return Ok(status),
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => bail!("form event stream closed"),
        }
    }
}

fn print_field_errors(view: &FormView, fields: &[Field]) {
    for field in fields {
        let Some(field_view) = view.field(*field) else {
            continue;
        };
        if !view.show_errors(*field) {
            continue;
        }
        for err in &field_view.errors {
            eprintln!("{}: {}", field.label(), err.message(*field));
        }
    }
}
