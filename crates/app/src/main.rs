use clap::Parser;
use engine::{Engine, FileSession};
use migration::{Migrator, MigratorTrait};

use crate::{cli::Cli, error::Result, settings::Settings};

mod cli;
mod error;
mod prompt;
mod settings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::debug!("command failed: {err:?}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli.overrides)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendbook={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = sea_orm::Database::connect(&settings.database_url).await?;
    Migrator::up(&db, None).await?;
    tracing::debug!(url = %settings.database_url, "database ready");

    let engine = Engine::builder()
        .database(db)
        .session(FileSession::new(
            settings.session_path.clone(),
            settings.session_ttl()?,
        ))
        .build();

    cli::run(&engine, &settings, cli.command).await
}
