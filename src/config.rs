//! Runtime configuration: data directory, optional TOML overrides, and the search
//! order used to locate the content documents.
//!
//! See `AppConfig` for the accepted TOML keys.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::store::StoreError;

pub const CHALLENGES_FILE: &str = "challenges.yaml";
pub const EXPLANATIONS_FILE: &str = "vuln_explanations.yaml";

const DATA_DIR_NAME: &str = ".blindspot-game";
const CONFIG_FILE: &str = "config.toml";

/// Optional settings read from `$BLINDSPOT_CONFIG` or `<data dir>/config.toml`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub challenges_path: Option<PathBuf>,
  pub explanations_path: Option<PathBuf>,
  pub error_notice_secs: u64,
  pub success_notice_secs: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      challenges_path: None,
      explanations_path: None,
      error_notice_secs: 10,
      success_notice_secs: 5,
    }
  }
}

impl AppConfig {
  pub fn error_notice_window(&self) -> Duration {
    Duration::from_secs(self.error_notice_secs)
  }

  pub fn success_notice_window(&self) -> Duration {
    Duration::from_secs(self.success_notice_secs)
  }
}

/// Per-user directory holding progress, settings and the log file.
/// `$BLINDSPOT_HOME` wins over `~/.blindspot-game`. Created on demand.
pub fn data_dir() -> Result<PathBuf, StoreError> {
  let dir = match std::env::var_os("BLINDSPOT_HOME") {
    Some(p) if !p.is_empty() => PathBuf::from(p),
    _ => dirs::home_dir().ok_or(StoreError::NoHomeDir)?.join(DATA_DIR_NAME),
  };
  ensure_dir(dir)
}

pub fn ensure_dir(dir: PathBuf) -> Result<PathBuf, StoreError> {
  std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir.clone(), source })?;
  Ok(dir)
}

/// Load `AppConfig`. On any IO/parse error we log and fall back to defaults.
pub fn load_app_config(data_dir: Option<&Path>) -> AppConfig {
  let path = match std::env::var_os("BLINDSPOT_CONFIG") {
    Some(p) => PathBuf::from(p),
    None => match data_dir {
      Some(d) => d.join(CONFIG_FILE),
      None => return AppConfig::default(),
    },
  };
  if !path.exists() {
    return AppConfig::default();
  }
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "blindspot", path = %path.display(), "Loaded app config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "blindspot", path = %path.display(), error = %e, "Failed to parse TOML config; using defaults");
        AppConfig::default()
      }
    },
    Err(e) => {
      error!(target: "blindspot", path = %path.display(), error = %e, "Failed to read TOML config; using defaults");
      AppConfig::default()
    }
  }
}

/// Candidate locations for a content file, in the order they are tried.
pub fn content_search_paths(file_name: &str, configured: Option<&Path>) -> Vec<PathBuf> {
  let mut paths = Vec::new();
  if let Some(p) = configured {
    paths.push(p.to_path_buf());
  }
  paths.push(Path::new("assets").join(file_name));
  paths.push(Path::new("..").join("assets").join(file_name));
  paths.push(Path::new("..").join("..").join("assets").join(file_name));
  paths.push(Path::new(".").join(file_name));
  if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
    paths.push(dir.join("assets").join(file_name));
  }
  paths
}
