mod cli;
mod ingest;
mod repl;
mod runtime;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use medichain_agents::prompts::with_disclaimer;
use medichain_agents::AgentState;
use medichain_server::{AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ServeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Chat(runtime) => repl::run(runtime::build_workflow(&runtime).await?).await,
        Command::Ask { question, runtime } => {
            let workflow = runtime::build_workflow(&runtime).await?;
            let state = workflow.run_turn(AgentState::new(), question).await?;
            println!("{}", with_disclaimer(state.generation.as_deref().unwrap_or_default()));
            println!("\nSource: {}", state.source);
            Ok(())
        }
        Command::Ingest(args) => ingest::run(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let workflow = runtime::build_workflow(&args.runtime).await?;
    let mut state = AppState::new(Arc::new(workflow));

    if let Some(url) = &args.database_url {
        match medichain_history::connect(url).await {
            Ok(store) => state = state.with_store(store),
            Err(err) => {
                tracing::warn!(error = %err, "history database unavailable, chat history will not be saved");
            }
        }
    }

    let config = ServerConfig {
        bind_addr: args.bind,
        turn_timeout: Duration::from_secs(args.turn_timeout_secs),
        max_concurrent_requests: args.max_concurrent_requests,
        ..ServerConfig::default()
    };
    medichain_server::serve(&config, state).await?;
    Ok(())
}
