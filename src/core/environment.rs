//! Process-local environment overlay for bootstrap child processes.
//!
//! The runner never mutates its own environment. Instead it accumulates the
//! exported variables (amended PATH, SECRET_KEY, FLASK_ENV, PORT) here and
//! applies them to every child command, including the final server exec.

use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct BootstrapEnv {
    vars: Vec<(String, String)>,
}

impl BootstrapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export a variable for all subsequent child processes.
    /// Re-exporting a key overwrites the previous value.
    pub fn export(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.vars.retain(|(k, _)| *k != key);
        self.vars.push((key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Prepend the venv bin directory to PATH so `pip`, `python`, and the
    /// server binary resolve inside the virtualenv.
    pub fn activate_venv(&mut self, venv_bin: &Path) {
        let base = std::env::var("PATH").unwrap_or_default();
        let path = prepend_path(&venv_bin.to_string_lossy(), &base);
        self.export("PATH", path);
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.vars
    }
}

fn prepend_path(dir: &str, base: &str) -> String {
    #[cfg(windows)]
    const SEP: char = ';';
    #[cfg(not(windows))]
    const SEP: char = ':';

    if base.is_empty() {
        dir.to_string()
    } else {
        format!("{}{}{}", dir, SEP, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn export_and_get() {
        let mut env = BootstrapEnv::new();
        env.export("FLASK_ENV", "production");
        assert_eq!(env.get("FLASK_ENV"), Some("production"));
        assert_eq!(env.get("SECRET_KEY"), None);
    }

    #[test]
    fn reexport_overwrites() {
        let mut env = BootstrapEnv::new();
        env.export("PORT", "5000");
        env.export("PORT", "8080");
        assert_eq!(env.get("PORT"), Some("8080"));
        assert_eq!(env.as_pairs().iter().filter(|(k, _)| k == "PORT").count(), 1);
    }

    #[test]
    fn prepend_path_puts_venv_first() {
        let joined = prepend_path("/srv/app/venv/bin", "/usr/bin:/bin");
        assert!(joined.starts_with("/srv/app/venv/bin"));
        assert!(joined.contains("/usr/bin"));
    }

    #[test]
    fn activate_venv_exports_path() {
        let mut env = BootstrapEnv::new();
        env.activate_venv(&PathBuf::from("/srv/app/venv/bin"));
        let path = env.get("PATH").unwrap();
        assert!(path.starts_with("/srv/app/venv/bin"));
    }
}
