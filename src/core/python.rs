//! Python interpreter detection.
//!
//! Detection is informational: the bootstrap run logs the version and keeps
//! going even when no interpreter is found, because a genuinely missing
//! interpreter surfaces as a tool failure at venv creation.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::command;

const CANDIDATES: &[&str] = &["python3", "python"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonInfo {
    pub program: String,
    pub version: String,
}

/// Probe candidate interpreters in order, returning the first that responds
/// to `--version`.
pub fn detect() -> Option<PythonInfo> {
    for program in CANDIDATES {
        if let Some(raw) = command::probe(program, &["--version"]) {
            return Some(PythonInfo {
                program: program.to_string(),
                version: parse_version(&raw),
            });
        }
    }
    None
}

/// Like [`detect`], but absence is an error. Used by the standalone
/// `appstrap python` command.
pub fn detect_or_err() -> Result<PythonInfo> {
    detect().ok_or_else(|| {
        Error::python_not_found(CANDIDATES.iter().map(|s| s.to_string()).collect())
    })
}

/// Extract the bare version from `--version` output ("Python 3.11.4" -> "3.11.4").
fn parse_version(raw: &str) -> String {
    raw.trim()
        .strip_prefix("Python ")
        .unwrap_or(raw.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_version_strips_prefix() {
        assert_eq!(parse_version("Python 3.11.4"), "3.11.4");
        assert_eq!(parse_version("Python 3.11.4\n"), "3.11.4");
    }

    #[test]
    fn parse_version_passes_through_unknown_format() {
        assert_eq!(parse_version("PyPy 7.3"), "PyPy 7.3");
    }
}
