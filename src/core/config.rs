use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Optional per-application config file name, looked up in the app directory.
pub const CONFIG_FILE: &str = "appstrap.json";

/// All configurable bootstrap settings that can be overridden via appstrap.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_venv_dir")]
    pub venv_dir: String,

    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_server_package")]
    pub server_package: String,

    #[serde(default = "default_app_module")]
    pub app_module: String,

    #[serde(default = "default_app_object")]
    pub app_object: String,

    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    #[serde(default = "default_workers")]
    pub workers: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_port")]
    pub default_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            venv_dir: default_venv_dir(),
            manifest: default_manifest(),
            server_package: default_server_package(),
            app_module: default_app_module(),
            app_object: default_app_object(),
            bind_host: default_bind_host(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
            default_port: default_port(),
        }
    }
}

impl AppConfig {
    /// The WSGI entry point in `module:object` form.
    pub fn entry_point(&self) -> String {
        format!("{}:{}", self.app_module, self.app_object)
    }
}

fn default_venv_dir() -> String {
    "venv".to_string()
}

fn default_manifest() -> String {
    "requirements.txt".to_string()
}

fn default_server_package() -> String {
    "gunicorn".to_string()
}

fn default_app_module() -> String {
    "app".to_string()
}

fn default_app_object() -> String {
    "app".to_string()
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_workers() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_port() -> u16 {
    5000
}

/// Load config from `<app_dir>/appstrap.json`, falling back to defaults
/// when the file is absent. A malformed file is a hard error, not a
/// silent fallback.
pub fn load(app_dir: &Path) -> Result<AppConfig> {
    let path = app_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&raw).map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}
