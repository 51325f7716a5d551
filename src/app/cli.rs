use crate::config::RemoteKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "study")]
#[command(about = "Study companion: summarize documents, chat with the assistant, track your progress")]
#[command(version = env!("STUDY_COMPANION_VERSION"))]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Config file (defaults to ~/.study-companion/config.yaml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the stats backend from the config file
    #[arg(long, global = true, value_enum)]
    pub remote: Option<RemoteArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteArg {
    File,
    Memory,
}

impl From<RemoteArg> for RemoteKind {
    fn from(arg: RemoteArg) -> Self {
        match arg {
            RemoteArg::File => RemoteKind::File,
            RemoteArg::Memory => RemoteKind::Memory,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Password confirmation (must match --password)
        #[arg(long)]
        confirm: String,
        /// Name shown on the dashboard
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in to an existing account
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Signout,
    /// Show the signed-in account
    Whoami,
    /// Show or change usage statistics
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },
    /// Check whether the stats backend is reachable
    Probe,
    /// Summarize a .txt or .pdf document
    Summarize { file: PathBuf },
    /// Ask the study assistant a question
    Chat {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Greeting and progress overview
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum StatsAction {
    /// Print the current counters
    Show {
        /// Print the store state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reload counters from the backend
    Refresh,
    /// Add one to a counter (documentsProcessed, questionsAsked, flashcardsCreated, quizzesCompleted)
    Increment { stat: String },
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
