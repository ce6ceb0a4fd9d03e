use clap::{Parser, Subcommand};

/// Provider roster data-quality analytics from the terminal.
///
/// Talks to the roster query service: runs the dashboard query battery or
/// forwards natural-language questions and renders the answers.
#[derive(Parser, Debug)]
#[command(name = "roster-cli", about = "Provider roster data-quality analytics")]
pub struct CliArgs {
    /// Query service base URL (overrides the profile configuration)
    #[arg(long, env = "ROSTER_API_URL", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every dashboard query once and print the cards
    Dashboard,
    /// Ask a single question and print the result
    Ask {
        /// The question, in plain English
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive question/answer session
    Chat,
    /// List sample questions
    Samples,
}

impl Command {
    /// Words of an `ask` question joined back into one string.
    pub fn question(&self) -> Option<String> {
        match self {
            Command::Ask { question } => Some(question.join(" ")),
            _ => None,
        }
    }
}
