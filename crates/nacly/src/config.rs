//! CLI configuration — thin wrapper around `nacly_config`.
//!
//! Applies `GlobalOpts` overrides (--config, --data-dir, --driver) on top
//! of the shared loader and wires the engine from the result.

use std::path::PathBuf;
use std::sync::Arc;

use nacly_core::{ControlPlane, FileLogSink, JsonStore, LogSink, build_driver};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use nacly_config::{Config, load_config_from, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` flag, else the shared resolution.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(nacly_config::config_path)
}

/// Load the config file + env, then apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&config_path(global))?;
    if let Some(ref dir) = global.data_dir {
        cfg.storage.data_dir = Some(dir.clone());
    }
    if let Some(driver) = global.driver {
        cfg.engine.driver = driver.into();
    }
    Ok(cfg)
}

/// Open the JSON store under the configured data directory.
pub fn open_store(cfg: &Config) -> Result<JsonStore, CliError> {
    Ok(JsonStore::open(cfg.data_dir())?)
}

/// Assemble a control plane over `store` with the configured driver and
/// the file decision log.
pub fn build_control_plane(cfg: &Config, store: Arc<JsonStore>) -> Result<ControlPlane, CliError> {
    let engine = cfg.to_engine_config()?;
    let log: Arc<dyn LogSink> = Arc::new(FileLogSink::open(cfg.log_file())?);
    let driver = build_driver(&engine, Arc::clone(&log));
    tracing::debug!(driver = driver.name(), log = %cfg.log_file().display(), "engine ready");
    Ok(ControlPlane::from_store(store, driver, log))
}
