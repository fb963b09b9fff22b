use std::path::{Path, PathBuf};
use std::sync::Arc;

use anitch::{
    create_collaborator, spawn_session, AnitchConfig, AppState, FileRecord, ProviderKind,
    SessionHandle, SessionSnapshot,
};
use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod render;
mod repl;

use repl::{ReplCommand, HELP};

/// Coherence-gated build pipeline simulator
#[derive(Parser, Debug)]
#[command(name = "anitch")]
#[command(about = "Analyze projects, watch simulated builds and spend coherence doing it")]
struct Args {
    /// Path to configuration file (TOML format)
    #[arg(long, env = "ANITCH_CONFIG")]
    config: Option<PathBuf>,

    /// Collaborator backend: stub, ollama or openai
    #[arg(long, env = "ANITCH_PROVIDER")]
    provider: Option<ProviderKind>,

    /// Model name passed to the collaborator
    #[arg(long, env = "ANITCH_MODEL")]
    model: Option<String>,

    /// Base URL of the collaborator API
    #[arg(long, env = "ANITCH_BASE_URL")]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> anyhow::Result<AnitchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration: {}", path.display());
            AnitchConfig::load(path)?
        }
        None => AnitchConfig::with_defaults()?,
    };
    if let Some(provider) = args.provider {
        config.collaborator.provider = provider;
    }
    if let Some(model) = &args.model {
        config.collaborator.model = Some(model.clone());
    }
    if let Some(base_url) = &args.base_url {
        config.collaborator.base_url = Some(base_url.clone());
    }
    Ok(config)
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<FileRecord>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(FileRecord::new(display_name(path), content));
    }
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print notifications and pipeline progress as they happen
fn spawn_printers(session: &SessionHandle) {
    let mut notifications = session.notifications();
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(n) => println!("{}", render::notification(&n)),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification printer lagged");
                }
                Err(_) => break,
            }
        }
    });

    let mut snapshots = session.subscribe();
    tokio::spawn(async move {
        let mut last = snapshots.borrow().clone();
        while snapshots.changed().await.is_ok() {
            let current = snapshots.borrow_and_update().clone();
            print_progress(&last, &current);
            last = current;
        }
    });
}

fn print_progress(last: &SessionSnapshot, current: &SessionSnapshot) {
    for view in &current.stages {
        let before = last.stages.iter().find(|s| s.stage == view.stage);
        if before.map(|b| b.status) != Some(view.status) {
            println!("{}", render::stage_line(view));
        }
    }
    if current.state == AppState::DisplayingOracleResponse
        && last.state != AppState::DisplayingOracleResponse
    {
        if let Some(text) = &current.oracle_response {
            println!("{}", render::oracle(text));
        }
    }
}

async fn handle_line(session: &SessionHandle, command: ReplCommand) -> anyhow::Result<bool> {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Submit(raw) => session.submit_command(raw).await?,
        ReplCommand::Drop(paths) => match read_files(&paths).await {
            Ok(files) => session.drop_files(files).await?,
            Err(e) => {
                println!("{} {:#}", "File Read Error".red().bold(), e);
                session.reset().await?;
            }
        },
        ReplCommand::ExitMeditation => session.exit_meditation().await?,
        ReplCommand::Reset => session.reset().await?,
        ReplCommand::Status => println!("{}", render::status(&session.snapshot().await?)),
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Invalid(message) => println!("{}", message.yellow()),
        ReplCommand::Quit => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let directive = if args.verbose { "anitch=debug" } else { "anitch=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = load_config(&args)?;
    let collaborator = create_collaborator(&config.collaborator)
        .context("Failed to set up the collaborator")?;
    let session = spawn_session(config, Arc::clone(&collaborator));
    spawn_printers(&session);

    println!("{}", "anitch: coherence-gated build simulator".bold());
    println!("{}", HELP.dimmed());
    println!("{}", render::status(&session.snapshot().await?));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle_line(&session, ReplCommand::parse(&line)).await? {
            break;
        }
    }

    session.shutdown().await?;
    Ok(())
}
