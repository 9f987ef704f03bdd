use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "medassist", version, about = "Symptom checker, skin image analysis and doctor lookup")]
pub struct Cli {
    /// Backend base URL [default: $MEDASSIST_API_URL, then http://127.0.0.1:8000]
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the backend is reachable
    Status,

    /// Describe your symptoms and get a ranked list of possible conditions
    Chat {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Classify a skin image
    Analyze { path: PathBuf },

    /// Find doctors by disease and/or symptom
    Doctors {
        #[arg(short, long, default_value = "")]
        disease: String,
        #[arg(short, long, default_value = "")]
        symptom: String,
    },

    /// Interactive session with all three panels
    Shell,
}
