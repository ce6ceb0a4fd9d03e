mod cli;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use roster_chat::{ConversationSession, SubmitOutcome, SAMPLE_QUESTIONS};
use roster_client::{HttpBackend, QueryBackend};
use roster_core::config::{load_dotenv, Config};
use roster_dashboard::{Dashboard, QUICK_ACTIONS};

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    if let Command::Samples = args.command {
        terminal.print_samples(SAMPLE_QUESTIONS)?;
        return Ok(());
    }

    let mut config = Config::from_env();
    if let Some(url) = args.api_url.as_deref() {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let backend: Arc<dyn QueryBackend> = Arc::new(
        HttpBackend::from_config(&config.api).context("failed to build query service client")?,
    );

    match &args.command {
        Command::Dashboard => run_dashboard(&terminal, backend).await,
        Command::Ask { .. } => {
            let question = args.command.question().unwrap_or_default();
            let session = new_session(backend, &config);
            submit(&terminal, &session, &question).await?;
            for entry in session.transcript() {
                terminal.print_entry(&entry)?;
            }
            if let Some(presenter) = session.presenter() {
                terminal.print_result(&presenter)?;
            }
            Ok(())
        }
        Command::Chat => run_chat(&terminal, backend, &config).await,
        Command::Samples => Ok(()),
    }
}

fn new_session(backend: Arc<dyn QueryBackend>, config: &Config) -> ConversationSession {
    ConversationSession::new(backend).with_chart_row_limit(config.presenter.chart_row_limit)
}

async fn submit(
    terminal: &Terminal,
    session: &ConversationSession,
    question: &str,
) -> Result<SubmitOutcome> {
    let spinner = terminal.start_spinner("Processing your question...")?;
    let outcome = session.submit(question).await;
    spinner.stop();
    Ok(outcome)
}

async fn run_dashboard(terminal: &Terminal, backend: Arc<dyn QueryBackend>) -> Result<()> {
    let mut dashboard = Dashboard::new(backend);

    let spinner = terminal.start_spinner("Loading dashboard...")?;
    let snapshot = dashboard.refresh().await;
    spinner.stop();

    for (name, error) in snapshot.bundle.failures() {
        terminal.print_error(&format!("{} query failed: {}", name, error))?;
    }

    terminal.print_stat_cards(&snapshot.stat_cards())?;
    for card in snapshot.problem_cards() {
        terminal.print_problem_card(&card)?;
    }
    terminal.print_series("Providers by State", &snapshot.state_breakdown)?;
    terminal.print_series("Lowest Quality Specialties", &snapshot.specialty_quality)?;
    terminal.print_quick_actions(QUICK_ACTIONS)?;
    Ok(())
}

async fn run_chat(
    terminal: &Terminal,
    backend: Arc<dyn QueryBackend>,
    config: &Config,
) -> Result<()> {
    let session = new_session(backend, config);
    terminal.print_banner(&config.api.base_url)?;
    terminal.print_info("Try one of these:")?;
    terminal.print_samples(SAMPLE_QUESTIONS)?;

    loop {
        let input = match terminal.read_input()? {
            Some(text) => text,
            None => {
                terminal.print_info("Goodbye.")?;
                break;
            }
        };

        if input.is_empty() {
            continue;
        }

        let before = session.transcript_len();
        let outcome = submit(terminal, &session, &input).await?;
        if let SubmitOutcome::Rejected(reason) = outcome {
            info!(?reason, "question not sent");
            continue;
        }

        // Show only what this exchange appended; the user line is already on screen.
        for entry in session.transcript().iter().skip(before + 1) {
            terminal.print_entry(entry)?;
        }
        if let SubmitOutcome::Answered { .. } = outcome {
            if let Some(presenter) = session.presenter() {
                terminal.print_result(&presenter)?;
            }
        }
    }

    Ok(())
}
