//! Production server launch.
//!
//! The terminal step: on Unix the runner process image is replaced by the
//! WSGI server via exec, so a successful launch never returns. Worker
//! lifecycle and request scheduling belong to the server binary, not here.

use std::path::Path;
use std::process::Command;

use serde::Serialize;

use crate::config::AppConfig;
use crate::environment::BootstrapEnv;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSpec {
    pub program: String,
    pub entry_point: String,
    pub bind: String,
    pub workers: u32,
    pub timeout_secs: u64,
}

impl ServerSpec {
    pub fn from_config(config: &AppConfig, port: u16, workers: Option<u32>, timeout: Option<u64>) -> Self {
        Self {
            program: config.server_package.clone(),
            entry_point: config.entry_point(),
            bind: format!("{}:{}", config.bind_host, port),
            workers: workers.unwrap_or(config.workers),
            timeout_secs: timeout.unwrap_or(config.timeout_secs),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "--workers".to_string(),
            self.workers.to_string(),
            "--timeout".to_string(),
            self.timeout_secs.to_string(),
            "--bind".to_string(),
            self.bind.clone(),
            self.entry_point.clone(),
        ]
    }

    /// Human-readable command line for logs, `plan`, and `--dry-run`.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args());
        parts.join(" ")
    }
}

/// Resolve the listen port: explicit flag beats the PORT environment
/// variable, which beats the configured default.
pub fn resolve_port(flag: Option<u16>, env_port: Option<&str>, default: u16) -> Result<u16> {
    if let Some(port) = flag {
        if port == 0 {
            return Err(Error::validation_invalid_argument(
                "port",
                "Must be between 1 and 65535",
            ));
        }
        return Ok(port);
    }

    match env_port {
        Some(raw) if !raw.is_empty() => match raw.parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(Error::config_invalid_value(
                "PORT",
                Some(raw.to_string()),
                "Must be an integer between 1 and 65535",
            )),
        },
        _ => Ok(default),
    }
}

/// Replace the current process with the server (Unix). On Windows, where
/// exec does not exist, run the server to completion and return its exit
/// code. Returning `Ok` is therefore only possible on Windows.
pub fn launch(spec: &ServerSpec, app_dir: &Path, env: &BootstrapEnv) -> Result<i32> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(spec.args());
    cmd.current_dir(app_dir);
    cmd.envs(env.as_pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())));

    log_status!("launch", "Starting server: {}", spec.command_line());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = cmd.exec();
        Err(Error::launch_failed(spec.command_line(), err.to_string())
            .with_hint("Is the server package installed in the virtualenv?"))
    }

    #[cfg(not(unix))]
    {
        let status = cmd
            .status()
            .map_err(|e| Error::launch_failed(spec.command_line(), e.to_string()))?;
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn command_line_uses_configured_defaults() {
        let spec = ServerSpec::from_config(&AppConfig::default(), 5000, None, None);
        assert_eq!(
            spec.command_line(),
            "gunicorn --workers 4 --timeout 120 --bind 0.0.0.0:5000 app:app"
        );
    }

    #[test]
    fn overrides_beat_config() {
        let spec = ServerSpec::from_config(&AppConfig::default(), 9000, Some(2), Some(30));
        assert_eq!(spec.workers, 2);
        assert_eq!(spec.timeout_secs, 30);
        assert_eq!(spec.bind, "0.0.0.0:9000");
    }

    #[test]
    fn port_flag_beats_env_beats_default() {
        assert_eq!(resolve_port(Some(9999), Some("8080"), 5000).unwrap(), 9999);
        assert_eq!(resolve_port(None, Some("8080"), 5000).unwrap(), 8080);
        assert_eq!(resolve_port(None, None, 5000).unwrap(), 5000);
        assert_eq!(resolve_port(None, Some(""), 5000).unwrap(), 5000);
    }

    #[test]
    fn invalid_env_port_is_config_error() {
        let err = resolve_port(None, Some("eighty"), 5000).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn port_zero_is_rejected() {
        let err = resolve_port(None, Some("0"), 5000).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);

        let err = resolve_port(Some(0), None, 5000).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
    }
}
