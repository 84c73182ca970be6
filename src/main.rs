use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ringside::config::{
    Settings, create_app_with, make_pool, reset_database, run_migrations,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Single-elimination brackets for combat-sports tournaments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server.
    Serve {
        /// TOML settings file.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
        #[arg(long, env = "BIND_ADDRESS")]
        bind: Option<String>,
    },
    /// Drop every table and recreate the (empty) schema.
    ResetDb {
        #[arg(long, env = "DATABASE_URL", default_value = "tournament.db")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    match Cli::parse().command {
        Command::Serve {
            config,
            database_url,
            bind,
        } => {
            let settings = Settings::load(config.as_deref())?
                .with_overrides(database_url, bind);
            tracing::info!("using database {}", settings.database_url);

            let pool = make_pool(&settings.database_url)?;
            run_migrations(&pool)?;

            let app = create_app_with(pool, settings.brackets);
            let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
            tracing::info!("listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Command::ResetDb { database_url } => {
            let pool = make_pool(&database_url)?;
            let (reverted, applied) = reset_database(&pool)?;
            tracing::info!(
                "reset {database_url} (reverted {reverted}, applied {applied} migrations)"
            );
        }
    }

    Ok(())
}
