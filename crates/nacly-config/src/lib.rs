//! Shared configuration for the nacly engine.
//!
//! One TOML file plus `NACLY_*` environment overrides, translated into
//! `nacly_core::EngineConfig` and the storage locations the CLI opens.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nacly_core::{DriverKind, EngineConfig};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "NACLY_CONFIG";

/// Prefix for environment overrides (`NACLY_ENGINE__DRIVER=mock`).
pub const ENV_PREFIX: &str = "NACLY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineSection {
    /// `auto`, `mock`, or `host-firewall`.
    #[serde(default)]
    pub driver: DriverKind,

    /// Per-command timeout for the host-firewall driver.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default = "default_firewall_binary")]
    pub firewall_binary: PathBuf,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            driver: DriverKind::default(),
            command_timeout_secs: default_command_timeout(),
            firewall_binary: default_firewall_binary(),
        }
    }
}

fn default_command_timeout() -> u64 {
    nacly_core::config::DEFAULT_COMMAND_TIMEOUT.as_secs()
}
fn default_firewall_binary() -> PathBuf {
    PathBuf::from(nacly_core::config::DEFAULT_FIREWALL_BINARY)
}

/// Where device, policy, and profile data and the decision log live.
///
/// Unset paths fall back to the platform data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Effective data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Effective decision log path (`<data_dir>/nac.log` unless set).
    pub fn log_file(&self) -> PathBuf {
        self.storage
            .log_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("nac.log"))
    }

    /// Translate into the engine's runtime settings.
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        if self.engine.command_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "engine.command_timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.engine.firewall_binary.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                field: "engine.firewall_binary".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(EngineConfig {
            driver: self.engine.driver,
            command_timeout: Duration::from_secs(self.engine.command_timeout_secs),
            firewall_binary: self.engine.firewall_binary.clone(),
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "nacly", "nacly")
}

/// Resolve the config file path: `$NACLY_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory used when `storage.data_dir` is unset.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("nacly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.engine.driver, DriverKind::Auto);
            assert_eq!(cfg.engine.command_timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn file_values_are_read() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [engine]
                driver = "host-firewall"
                command_timeout_secs = 2
                firewall_binary = "/usr/sbin/iptables"

                [storage]
                data_dir = "/var/lib/nacly"
                "#,
            )?;
            let cfg = load_config_from(&jail.directory().join("config.toml"))
                .map_err(|e| e.to_string())?;

            assert_eq!(cfg.engine.driver, DriverKind::HostFirewall);
            assert_eq!(cfg.data_dir(), PathBuf::from("/var/lib/nacly"));
            assert_eq!(cfg.log_file(), PathBuf::from("/var/lib/nacly/nac.log"));

            let engine = cfg.to_engine_config().map_err(|e| e.to_string())?;
            assert_eq!(engine.command_timeout, Duration::from_secs(2));
            assert_eq!(engine.firewall_binary, PathBuf::from("/usr/sbin/iptables"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[engine]\ndriver = \"host-firewall\"\n")?;
            jail.set_env("NACLY_ENGINE__DRIVER", "mock");
            jail.set_env("NACLY_STORAGE__LOG_FILE", "/tmp/decisions.log");

            let cfg = load_config_from(&jail.directory().join("config.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.engine.driver, DriverKind::Mock);
            assert_eq!(cfg.log_file(), PathBuf::from("/tmp/decisions.log"));
            Ok(())
        });
    }

    #[test]
    fn config_env_var_selects_the_file() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("custom.toml");
            jail.set_env(CONFIG_ENV, path.display());
            assert_eq!(config_path(), path);

            jail.create_file("custom.toml", "[engine]\ncommand_timeout_secs = 9\n")?;
            let cfg = load_config().map_err(|e| e.to_string())?;
            assert_eq!(cfg.engine.command_timeout_secs, 9);
            Ok(())
        });
    }

    #[test]
    fn unknown_driver_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[engine]\ndriver = \"openflow\"\n")?;
            let result = load_config_from(&jail.directory().join("config.toml"));
            assert!(matches!(result, Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut cfg = Config::default();
        cfg.engine.command_timeout_secs = 0;
        assert!(matches!(
            cfg.to_engine_config(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut cfg = Config::default();
        cfg.engine.driver = DriverKind::Mock;
        cfg.storage.data_dir = Some(dir.path().join("data"));

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("driver = \"mock\""));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.engine, cfg.engine);
        assert_eq!(loaded.storage, cfg.storage);
    }
}
