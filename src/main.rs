use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kitabak::app::AppContext;
use kitabak::cli::{commands, Cli, Commands};
use kitabak::config::Config;
use kitabak::domain::UserId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    let config = Config::load()?;
    let user = UserId::new(cli.user.clone().unwrap_or_else(|| config.reading.user.clone()));
    let db_path = cli.db.clone().or_else(|| config.reading.database.clone());
    let ctx = AppContext::new(db_path, user, config.reading.default_goal_minutes)?;

    match cli.command {
        Commands::Stats { json } => {
            commands::show_stats(&ctx, json).await?;
        }
        Commands::Goal { minutes } => {
            commands::set_goal(&ctx, &minutes).await?;
        }
        Commands::Resume { open } => {
            commands::resume(&ctx, open).await?;
        }
        Commands::Record {
            seconds,
            book,
            title,
        } => {
            commands::record(&ctx, seconds, book.as_deref(), title.as_deref()).await?;
        }
        Commands::Read {
            book,
            title,
            no_open,
        } => {
            commands::read(
                Arc::new(ctx),
                Arc::new(config),
                &book,
                title.as_deref(),
                no_open,
            )
            .await?;
        }
    }

    Ok(())
}

// The reading screen owns the terminal, so logs go to a file when asked.
fn init_tracing(log: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }
    Ok(())
}
