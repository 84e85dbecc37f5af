use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    PythonNotFound,
    ManifestNotFound,

    VenvCreateFailed,
    InstallFailed,
    InitDbFailed,
    LaunchFailed,
    StepFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::PythonNotFound => "python.not_found",
            ErrorCode::ManifestNotFound => "bootstrap.manifest_not_found",

            ErrorCode::VenvCreateFailed => "venv.create_failed",
            ErrorCode::InstallFailed => "bootstrap.install_failed",
            ErrorCode::InitDbFailed => "bootstrap.init_db_failed",
            ErrorCode::LaunchFailed => "bootstrap.launch_failed",
            ErrorCode::StepFailed => "bootstrap.step_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonNotFoundDetails {
    pub tried: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestNotFoundDetails {
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::to_value(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn python_not_found(tried: Vec<String>) -> Self {
        let details = serde_json::to_value(PythonNotFoundDetails { tried })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::PythonNotFound,
            "No Python interpreter found",
            details,
        )
        .with_hint("Install python3 and make sure it is on PATH")
    }

    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let details = serde_json::to_value(ManifestNotFoundDetails { path: path.clone() })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ManifestNotFound,
            format!("Dependency manifest not found: {}", path),
            details,
        )
        .with_hint("Create a requirements.txt in the application directory")
    }

    pub fn venv_create_failed(command: impl Into<String>, exit_code: i32, stderr: String) -> Self {
        Self::command_failed(
            ErrorCode::VenvCreateFailed,
            "Virtualenv creation failed",
            command,
            exit_code,
            stderr,
        )
    }

    pub fn install_failed(command: impl Into<String>, exit_code: i32, stderr: String) -> Self {
        Self::command_failed(
            ErrorCode::InstallFailed,
            "Dependency install failed",
            command,
            exit_code,
            stderr,
        )
    }

    pub fn init_db_failed(command: impl Into<String>, exit_code: i32, stderr: String) -> Self {
        Self::command_failed(
            ErrorCode::InitDbFailed,
            "Database initialization failed",
            command,
            exit_code,
            stderr,
        )
    }

    pub fn launch_failed(command: impl Into<String>, error: impl Into<String>) -> Self {
        let details = serde_json::json!({
            "command": command.into(),
            "error": error.into(),
        });

        Self::new(ErrorCode::LaunchFailed, "Server launch failed", details)
    }

    pub fn step_failed(command: impl Into<String>, exit_code: i32, stderr: String) -> Self {
        Self::command_failed(
            ErrorCode::StepFailed,
            "Bootstrap step failed",
            command,
            exit_code,
            stderr,
        )
    }

    fn command_failed(
        code: ErrorCode,
        message: &str,
        command: impl Into<String>,
        exit_code: i32,
        stderr: String,
    ) -> Self {
        let details = serde_json::to_value(CommandFailedDetails {
            command: command.into(),
            exit_code,
            stderr,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(code, message, details)
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": error.into(),
            "context": context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_dotted_strings() {
        assert_eq!(ErrorCode::InstallFailed.as_str(), "bootstrap.install_failed");
        assert_eq!(ErrorCode::VenvCreateFailed.as_str(), "venv.create_failed");
        assert_eq!(ErrorCode::PythonNotFound.as_str(), "python.not_found");
        assert_eq!(ErrorCode::ConfigInvalidJson.as_str(), "config.invalid_json");
    }

    #[test]
    fn command_failure_keeps_exit_code_in_details() {
        let err = Error::install_failed("pip install -r requirements.txt", 2, "boom".to_string());
        assert_eq!(err.code, ErrorCode::InstallFailed);
        assert_eq!(err.details["exitCode"], 2);
        assert_eq!(err.details["command"], "pip install -r requirements.txt");
    }

    #[test]
    fn with_hint_accumulates() {
        let err = Error::manifest_not_found("requirements.txt").with_hint("second hint");
        assert_eq!(err.hints.len(), 2);
    }
}
