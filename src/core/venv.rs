//! Virtualenv provisioning.
//!
//! The venv directory is an opaque, idempotent resource: created once,
//! reused on every later run, never destroyed here. A half-created
//! directory is left in place for the next run to reuse or repair.

use std::path::{Path, PathBuf};

use crate::environment::BootstrapEnv;
use crate::error::{Error, Result};
use crate::utils::{command, shell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenvStatus {
    Created,
    Reused,
}

pub fn venv_path(app_dir: &Path, venv_dir: &str) -> PathBuf {
    app_dir.join(venv_dir)
}

/// Directory holding the venv's executables (`bin` on Unix, `Scripts` on Windows).
pub fn bin_dir(venv: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        venv.join("Scripts")
    }

    #[cfg(not(windows))]
    {
        venv.join("bin")
    }
}

pub fn is_present(app_dir: &Path, venv_dir: &str) -> bool {
    venv_path(app_dir, venv_dir).is_dir()
}

/// The creation command, built separately so `--dry-run` and `plan` can show
/// it without executing.
pub fn create_command(python_program: &str, venv_dir: &str) -> String {
    format!(
        "{} -m venv {}",
        shell::quote_arg(python_program),
        shell::quote_arg(venv_dir)
    )
}

/// Ensure the venv directory exists, creating it when absent.
/// Idempotent: an existing directory is a no-op.
pub fn ensure(
    app_dir: &Path,
    venv_dir: &str,
    python_program: &str,
    env: &BootstrapEnv,
) -> Result<VenvStatus> {
    if is_present(app_dir, venv_dir) {
        return Ok(VenvStatus::Reused);
    }

    let cmd = create_command(python_program, venv_dir);
    log_status!("bootstrap", "Creating virtualenv: {}", cmd);
    let output = command::run_shell(&cmd, Some(app_dir), env.as_pairs());
    if !output.success {
        return Err(Error::venv_create_failed(
            cmd,
            output.exit_code,
            output.stderr,
        ));
    }

    Ok(VenvStatus::Created)
}
