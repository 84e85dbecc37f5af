//! Dependency installation inside the activated venv.
//!
//! Three installs run in order: pip self-upgrade, the manifest, then the
//! production server package. With the venv bin directory first on PATH,
//! plain `pip` resolves inside the virtualenv.

use std::path::Path;

use crate::config::AppConfig;
use crate::environment::BootstrapEnv;
use crate::error::{Error, Result};
use crate::utils::{command, shell};

/// The ordered install commands for a config. Exposed separately so
/// `--dry-run` and `plan` can show them without executing.
pub fn commands(config: &AppConfig) -> Vec<String> {
    vec![
        "pip install --upgrade pip".to_string(),
        format!("pip install -r {}", shell::quote_arg(&config.manifest)),
        format!("pip install {}", shell::quote_arg(&config.server_package)),
    ]
}

/// Run the install sequence. The manifest must exist; any failing install
/// aborts the whole run.
pub fn run(app_dir: &Path, config: &AppConfig, env: &BootstrapEnv) -> Result<()> {
    let manifest_path = app_dir.join(&config.manifest);
    if !manifest_path.is_file() {
        return Err(Error::manifest_not_found(
            manifest_path.display().to_string(),
        ));
    }

    for cmd in commands(config) {
        log_status!("bootstrap", "Running: {}", cmd);
        let output = command::run_shell_passthrough(&cmd, Some(app_dir), env.as_pairs());
        if !output.success {
            return Err(Error::install_failed(cmd, output.exit_code, output.stderr));
        }
    }

    Ok(())
}
