//! Database initialization via the application's `init_db()` entry point.
//!
//! The application package is an external collaborator; all this module does
//! is invoke its module-level initializer inside the venv. Any exception
//! there is fatal to the deployment.

use std::path::Path;

use crate::environment::BootstrapEnv;
use crate::error::{Error, Result};
use crate::utils::{command, shell};

/// Build the init-db invocation for an application module.
/// The module name is validated first; it is embedded in generated code.
pub fn init_command(app_module: &str) -> Result<String> {
    validate_module_name(app_module)?;
    let snippet = format!("from {} import init_db; init_db()", app_module);
    Ok(format!("python -c {}", shell::quote_arg(&snippet)))
}

/// Run the application's `init_db()` in the app directory with the venv
/// environment applied.
pub fn run_init(app_dir: &Path, app_module: &str, env: &BootstrapEnv) -> Result<()> {
    let cmd = init_command(app_module)?;
    log_status!("bootstrap", "Initializing database: {}", cmd);
    let output = command::run_shell_passthrough(&cmd, Some(app_dir), env.as_pairs());
    if !output.success {
        return Err(Error::init_db_failed(cmd, output.exit_code, output.stderr));
    }
    Ok(())
}

/// Dotted Python module path: identifier segments separated by dots.
pub fn validate_module_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                }
                _ => false,
            }
        });

    if valid {
        Ok(())
    } else {
        Err(Error::config_invalid_value(
            "appModule",
            Some(name.to_string()),
            "Must be a dotted Python module path (e.g. 'app' or 'pkg.app')",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn init_command_embeds_module() {
        let cmd = init_command("tracker").unwrap();
        assert_eq!(cmd, "python -c 'from tracker import init_db; init_db()'");
    }

    #[test]
    fn dotted_module_paths_are_accepted() {
        assert!(validate_module_name("pkg.app").is_ok());
        assert!(validate_module_name("_private").is_ok());
    }

    #[test]
    fn shell_metacharacters_are_rejected() {
        for bad in ["", "1app", "app; rm -rf /", "app module", "pkg..app"] {
            let err = validate_module_name(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::ConfigInvalidValue, "input: {:?}", bad);
        }
    }
}
