//! Layered runtime configuration: a TOML file with a `GATESYNC_`-prefixed
//! environment on top (`GATESYNC_IVMS__PASSWORD=...` overrides
//! `[ivms] password`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub cardskipper: CardskipperSettings,
  pub ivms:        IvmsSettings,
  pub store:       StoreSettings,
  #[serde(default)]
  pub sync:        SyncSettings,
  #[serde(default)]
  pub api:         ApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardskipperSettings {
  pub base_url:        String,
  pub username:        String,
  pub password:        String,
  pub organisation_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IvmsSettings {
  pub base_url:  String,
  pub username:  String,
  pub password:  String,
  #[serde(default = "default_page_size")]
  pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
  pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
  #[serde(default = "default_interval_secs")]
  pub interval_secs: u64,
}

impl Default for SyncSettings {
  fn default() -> Self {
    Self {
      interval_secs: default_interval_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
  #[serde(default)]
  pub enabled: bool,
  #[serde(default = "default_api_host")]
  pub host:    String,
  #[serde(default = "default_api_port")]
  pub port:    u16,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      enabled: false,
      host:    default_api_host(),
      port:    default_api_port(),
    }
  }
}

fn default_page_size() -> u32 {
  gatesync_ivms::IvmsConfig::DEFAULT_PAGE_SIZE
}

fn default_interval_secs() -> u64 { 300 }

fn default_api_host() -> String { "127.0.0.1".to_string() }

fn default_api_port() -> u16 { 8641 }

/// Load settings from `path` (optional) layered under the environment.
pub fn load(path: &Path) -> anyhow::Result<Settings> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("GATESYNC").separator("__"))
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialise settings")
}
