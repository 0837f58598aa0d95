//! # feedsync: RSS Feed Migration CLI
//!
//! This binary is a thin entrypoint. All logic lives in the `feedsync_cli`
//! library crate.

use anyhow::Result;
use clap::Parser;
use feedsync_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the migration summary.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("feedsync=info".parse()?)
                .add_directive("feedsync_cli=info".parse()?)
                .add_directive("feedsync_rss=info".parse()?),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("[feedsync error] Migration failed: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
