mod cli;
mod interactive;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use services::{AppServices, InterviewController, RoundOutcome, ServiceConfig};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config =
        ServiceConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    debug!(
        api_base = %config.api_base(),
        timeout_secs = config.timeout_secs,
        max_questions = config.max_questions,
        "configuration loaded"
    );
    let services = AppServices::connect(&config, cli.token.as_deref())
        .await
        .context("failed to set up the interview service client")?;

    match cli.command {
        Command::Start { role, difficulty } => {
            render::identity(services.identity().identity());
            let controller = services.controller();
            let first = controller.start(&role, difficulty).await?;
            announce_session(&controller);
            interactive::run(&controller, first).await
        }
        Command::Resume { id } => {
            let controller = services.controller();
            let first = controller.resume(&id).await?;
            if !matches!(first, RoundOutcome::AlreadyCompleted(_)) {
                announce_session(&controller);
            }
            interactive::run(&controller, first).await
        }
        Command::List => {
            let items = services.reader().list_sessions().await?;
            render::session_list(&items);
            Ok(())
        }
        Command::Report { id } => {
            let opened = services.reader().open_report(&id).await?;
            let session = &opened.session;
            println!(
                "{} {} ({}), started {}",
                "Interview".bold(),
                session.role(),
                session.difficulty(),
                session.started_at().format("%Y-%m-%d %H:%M")
            );
            render::report_state(&opened.report);
            Ok(())
        }
        Command::Whoami => {
            render::identity(services.identity().identity());
            Ok(())
        }
    }
}

fn announce_session(controller: &InterviewController) {
    if let Some(session) = controller.view().store.session {
        println!(
            "{} {} ({}) {}",
            "Interview".bold(),
            session.role(),
            session.difficulty(),
            format!("id {}", session.id()).dimmed()
        );
    }
}
