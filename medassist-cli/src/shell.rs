//! Interactive session driving the three panels at once.
//!
//! Requests are spawned, so the prompt stays usable while one is in flight and a
//! second action on the same panel gets rejected instead of queued. Leaving the
//! session waits for whatever is still in flight.

use anyhow::Result;
use medassist_core::{ActionOutcome, MedicalAssistant};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::{console, image_file};

const HELP: &str = "\
Type your symptoms to chat with the assistant, or use a command:
  :image PATH               select a skin image
  :analyze                  analyze the selected image
  :reset                    clear the selected image and result
  :doctors DISEASE | SYMPTOM  find doctors (either side may be empty)
  :new                      start a new doctor search
  :close                    close the doctor search
  :transcript               show the whole conversation
  :help                     show this help
  :quit                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Chat(String),
    Image(PathBuf),
    Analyze,
    Reset,
    Doctors { disease: String, symptom: String },
    NewSearch,
    Close,
    Transcript,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Commands are matched on the trimmed line; chat text is passed through as typed.
pub fn parse_command(raw: &str) -> ShellCommand {
    let line = raw.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ShellCommand::Chat(raw.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    match name {
        "image" if !rest.is_empty() => ShellCommand::Image(PathBuf::from(rest)),
        "analyze" => ShellCommand::Analyze,
        "reset" => ShellCommand::Reset,
        "doctors" => {
            let (disease, symptom) = rest.split_once('|').unwrap_or((rest, ""));
            ShellCommand::Doctors {
                disease: disease.trim().to_string(),
                symptom: symptom.trim().to_string(),
            }
        }
        "new" => ShellCommand::NewSearch,
        "close" => ShellCommand::Close,
        "transcript" => ShellCommand::Transcript,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "q" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line.to_string()),
    }
}

/// Reads commands from `input` until `:quit` or end of input, then waits for
/// every request still in flight before returning.
pub async fn run<R>(assistant: MedicalAssistant, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", HELP);
    let mut lines = input.lines();
    let mut pending = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        while let Some(finished) = pending.try_join_next() {
            log_join(finished);
        }

        let command = parse_command(&line);
        debug!(?command, "Shell command");

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Unknown(other) => println!("Unknown command: {} (try :help)", other),
            ShellCommand::Transcript => console::print_transcript(&assistant.conversation),
            ShellCommand::Chat(text) => {
                let conversation = assistant.conversation.clone();
                pending.spawn(async move {
                    let outcome = conversation.submit(&text).await;
                    console::print_chat_outcome(&conversation, &outcome);
                });
            }
            ShellCommand::Image(path) => match image_file::load(&path).await {
                Ok(file) => {
                    if let ActionOutcome::Applied = assistant.upload.select_file(file) {
                        println!("Selected {}", path.display());
                    }
                }
                Err(e) => println!("{:#}", e),
            },
            ShellCommand::Analyze => {
                let upload = assistant.upload.clone();
                pending.spawn(async move {
                    let outcome = upload.analyze().await;
                    console::print_analysis_outcome(&upload, &outcome);
                });
            }
            ShellCommand::Reset => {
                assistant.upload.reset();
                println!("Image cleared.");
            }
            ShellCommand::Doctors { disease, symptom } => {
                let doctors = assistant.doctors.clone();
                pending.spawn(async move {
                    let outcome = doctors.search(&disease, &symptom).await;
                    console::print_doctors_outcome(&doctors, &outcome);
                });
            }
            ShellCommand::NewSearch => {
                assistant.doctors.new_search();
                let (disease, symptom) = assistant.doctors.fields();
                println!("New search (disease: {:?}, symptom: {:?})", disease, symptom);
            }
            ShellCommand::Close => {
                assistant.doctors.close();
                println!("Doctor search closed.");
            }
        }
    }

    if !pending.is_empty() {
        info!(pending = pending.len(), "Waiting for requests in flight");
    }
    while let Some(finished) = pending.join_next().await {
        log_join(finished);
    }

    info!(messages = assistant.conversation.len(), "Shell session ended");
    Ok(())
}

fn log_join(finished: std::result::Result<(), JoinError>) {
    if let Err(e) = finished {
        error!(error = %e, "Shell action panicked");
    }
}
