//! `gatesync` — one-way Cardskipper → IVMS membership synchronizer.
//!
//! Reads `gatesync.toml` (or the path given with `--config`), opens the
//! SQLite mapping store, and either runs a single pass, schedules passes on
//! a fixed interval (optionally serving the status API), or answers a point
//! lookup.
//!
//! # Usage
//!
//! ```text
//! gatesync run                      # one pass, report printed as JSON
//! gatesync serve                    # pass every [sync].interval_secs
//! gatesync lookup adi@example.com   # resolved IVMS employee number
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gatesync_api::AppState;
use gatesync_cardskipper::{CardskipperClient, CardskipperConfig};
use gatesync_core::{engine::SyncEngine, store::MappingStore as _};
use gatesync_ivms::{IvmsClient, IvmsConfig};
use gatesync_store_sqlite::SqliteMappingStore;
use settings::Settings;
use tokio::{
  net::TcpListener,
  sync::RwLock,
  time::{self, Duration, MissedTickBehavior},
};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
  name = "gatesync",
  version,
  about = "One-way Cardskipper to IVMS membership synchronizer"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "gatesync.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a single synchronization pass and print the report as JSON.
  Run,
  /// Run passes on a fixed interval; optionally serve the status API.
  Serve,
  /// Print the resolved access-control identity for one email.
  Lookup { email: String },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

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
  let settings = settings::load(&cli.config)?;

  match cli.command {
    Command::Run => run_once(settings).await,
    Command::Serve => serve(settings).await,
    Command::Lookup { email } => lookup(settings, &email).await,
  }
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

async fn open_store(settings: &Settings) -> anyhow::Result<SqliteMappingStore> {
  SqliteMappingStore::open(&settings.store.path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", settings.store.path)
    })
}

fn build_engine(
  settings: &Settings,
  store: SqliteMappingStore,
) -> anyhow::Result<SyncEngine<SqliteMappingStore, CardskipperClient, IvmsClient>>
{
  let source = CardskipperClient::new(CardskipperConfig {
    base_url:        settings.cardskipper.base_url.clone(),
    username:        settings.cardskipper.username.clone(),
    password:        settings.cardskipper.password.clone(),
    organisation_id: settings.cardskipper.organisation_id,
  })
  .context("failed to build cardskipper client")?;

  let sink = IvmsClient::new(IvmsConfig {
    base_url:  settings.ivms.base_url.clone(),
    username:  settings.ivms.username.clone(),
    password:  settings.ivms.password.clone(),
    page_size: settings.ivms.page_size,
  })
  .context("failed to build ivms client")?;

  Ok(SyncEngine::new(store, source, sink))
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn run_once(settings: Settings) -> anyhow::Result<()> {
  let store = open_store(&settings).await?;
  let engine = build_engine(&settings, store)?;

  let report = engine.run_pass().await.context("sync pass aborted")?;
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}

async fn lookup(settings: Settings, email: &str) -> anyhow::Result<()> {
  let store = open_store(&settings).await?;
  match store.identity_id(email).await? {
    Some(id) => {
      println!("{id}");
      Ok(())
    }
    None => anyhow::bail!("no resolved identity for {email}"),
  }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
  let store = open_store(&settings).await?;
  let last_report = Arc::new(RwLock::new(None));

  if settings.api.enabled {
    let state = AppState {
      store:       Arc::new(store.clone()),
      last_report: Arc::clone(&last_report),
    };
    let app = gatesync_api::router(state);
    let address = format!("{}:{}", settings.api.host, settings.api.port);
    let listener = TcpListener::bind(&address)
      .await
      .with_context(|| format!("failed to bind {address}"))?;
    info!("status API listening on http://{address}");

    tokio::spawn(async move {
      if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "status API server exited");
      }
    });
  }

  let engine = build_engine(&settings, store)?;

  // Passes are serialized by construction: one loop, one pass at a time. A
  // pass that overruns the interval delays the next tick instead of
  // overlapping it.
  let mut ticker =
    time::interval(Duration::from_secs(settings.sync.interval_secs));
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  info!(
    interval_secs = settings.sync.interval_secs,
    "sync scheduler started"
  );
  loop {
    ticker.tick().await;
    match engine.run_pass().await {
      Ok(report) => {
        *last_report.write().await = Some(report);
      }
      Err(e) => {
        error!(error = %e, "sync pass aborted; will retry on next tick");
      }
    }
  }
}
