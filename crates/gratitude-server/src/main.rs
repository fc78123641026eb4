//! gratitude-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `GRATITUDE_*` environment variables, then serves the statistics API over
//! HTTP.
//!
//! ```sh
//! GRATITUDE_SOURCE_URL=https://example.test/exec cargo run -p gratitude-server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use gratitude_api::CatRegistry;
use gratitude_server::ServerConfig;
use gratitude_store::{EntryStore, SheetSource};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gratitude statistics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let source = SheetSource::new(&server_cfg.source_url, server_cfg.fetch_timeout())
    .context("failed to build HTTP client")?;
  let store = Arc::new(EntryStore::new(source));

  gratitude_server::spawn_refresher(store.clone(), server_cfg.refresh_interval());

  let app = gratitude_server::router(
    store,
    server_cfg.retry_policy(),
    Arc::new(CatRegistry::seeded()),
  );
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
