mod cli;
mod console;
mod image_file;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use medassist_core::{
    ActionOutcome, ApiConfig, HttpMedicalApi, MedicalApi, MedicalAssistant, Notifier,
    TracingNotifier,
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::console::ConsoleNotifier;

/// Log lines go to stderr so stdout only carries results
fn init_tracing() -> bool {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medassist_cli=info,medassist_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
            true
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .init();
            false
        }
    }
}

fn exit_code(outcome: &ActionOutcome) -> ExitCode {
    if outcome.is_applied() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let json_logs = init_tracing();
    let cli = Cli::parse();

    let config = ApiConfig::resolve(cli.api_url.as_deref());
    info!(base = %config.health_url, "Using backend");

    // Structured runs keep notifications in the log stream
    let notifier: Arc<dyn Notifier> = if json_logs {
        Arc::new(TracingNotifier)
    } else {
        Arc::new(ConsoleNotifier)
    };

    match cli.command {
        Command::Status => {
            let api = HttpMedicalApi::new(config);
            let status = api
                .ping()
                .await
                .with_context(|| format!("Backend at {} is not reachable", api.config().health_url))?;
            println!("{}", status.message.as_deref().unwrap_or("Backend is up"));
            Ok(ExitCode::SUCCESS)
        }
        Command::Chat { text } => {
            let assistant = MedicalAssistant::connect(config, notifier);
            let outcome = assistant.conversation.submit(&text.join(" ")).await;
            match &outcome {
                ActionOutcome::Rejected(rejection) => {
                    println!("{}", console::rejection_line(rejection));
                }
                _ => console::print_transcript(&assistant.conversation),
            }
            Ok(exit_code(&outcome))
        }
        Command::Analyze { path } => {
            let assistant = MedicalAssistant::connect(config, notifier);
            let file = image_file::load(&path).await?;
            let selected = assistant.upload.select_file(file);
            if !selected.is_applied() {
                console::print_analysis_outcome(&assistant.upload, &selected);
                return Ok(ExitCode::FAILURE);
            }
            assistant.upload.wait_for_preview().await;

            let outcome = assistant.upload.analyze().await;
            console::print_analysis_outcome(&assistant.upload, &outcome);
            Ok(exit_code(&outcome))
        }
        Command::Doctors { disease, symptom } => {
            let assistant = MedicalAssistant::connect(config, notifier);
            let outcome = assistant.doctors.search(&disease, &symptom).await;
            console::print_doctors_outcome(&assistant.doctors, &outcome);
            Ok(exit_code(&outcome))
        }
        Command::Shell => {
            let assistant = MedicalAssistant::connect(config, notifier);
            shell::run(assistant, BufReader::new(tokio::io::stdin())).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
