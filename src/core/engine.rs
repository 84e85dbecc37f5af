//! Sequential step engine with fail-fast semantics.
//!
//! Each step is a precondition for the next: the first failure records an
//! error for that step, marks everything after it skipped, and stops. There
//! are no retries and no rollback. The executor is a trait so command
//! handlers and tests can drive the same ordering logic.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PythonVersion,
    EnsureVenv,
    ActivateVenv,
    InstallDeps,
    ResolveSecret,
    SetMode,
    InitDb,
    Launch,
}

impl Step {
    /// The full bootstrap sequence, in execution order.
    pub fn all() -> [Step; 8] {
        [
            Step::PythonVersion,
            Step::EnsureVenv,
            Step::ActivateVenv,
            Step::InstallDeps,
            Step::ResolveSecret,
            Step::SetMode,
            Step::InitDb,
            Step::Launch,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Step::PythonVersion => "python-version",
            Step::EnsureVenv => "ensure-venv",
            Step::ActivateVenv => "activate-venv",
            Step::InstallDeps => "install-deps",
            Step::ResolveSecret => "resolve-secret",
            Step::SetMode => "set-mode",
            Step::InitDb => "init-db",
            Step::Launch => "launch",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::PythonVersion => "Detect Python interpreter",
            Step::EnsureVenv => "Ensure virtualenv",
            Step::ActivateVenv => "Activate virtualenv",
            Step::InstallDeps => "Install dependencies",
            Step::ResolveSecret => "Resolve SECRET_KEY",
            Step::SetMode => "Set production mode",
            Step::InitDb => "Initialize database",
            Step::Launch => "Launch server",
        }
    }
}

/// What a successfully executed step reports back.
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub detail: Option<String>,
}

impl StepOutcome {
    pub fn with_detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }
}

pub trait StepExecutor {
    fn execute(&mut self, step: Step) -> Result<StepOutcome>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failed,
    Skipped,
}

/// The failing step's error, kept structured so the JSON report preserves
/// the code and the failing command's exit code, not just a message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl StepError {
    fn from_error(err: &Error) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub id: String,
    pub label: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    pub steps: Vec<StepResult>,
    pub summary: RunSummary,
}

/// Run steps strictly in order, stopping at the first failure.
pub fn run(steps: &[Step], executor: &mut dyn StepExecutor) -> RunResult {
    let mut results = Vec::with_capacity(steps.len());
    let mut failed = false;

    for step in steps {
        if failed {
            results.push(StepResult {
                id: step.id().to_string(),
                label: step.label().to_string(),
                status: StepStatus::Skipped,
                detail: None,
                error: None,
            });
            continue;
        }

        match executor.execute(*step) {
            Ok(outcome) => results.push(StepResult {
                id: step.id().to_string(),
                label: step.label().to_string(),
                status: StepStatus::Success,
                detail: outcome.detail,
                error: None,
            }),
            Err(err) => {
                failed = true;
                results.push(StepResult {
                    id: step.id().to_string(),
                    label: step.label().to_string(),
                    status: StepStatus::Failed,
                    detail: None,
                    error: Some(StepError::from_error(&err)),
                });
            }
        }
    }

    let summary = RunSummary {
        total: results.len(),
        succeeded: results
            .iter()
            .filter(|r| r.status == StepStatus::Success)
            .count(),
        failed: results
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
            .count(),
        skipped: results
            .iter()
            .filter(|r| r.status == StepStatus::Skipped)
            .count(),
    };

    RunResult {
        success: !failed,
        steps: results,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailAt {
        fail_step: Step,
        executed: Vec<&'static str>,
    }

    impl StepExecutor for FailAt {
        fn execute(&mut self, step: Step) -> Result<StepOutcome> {
            self.executed.push(step.id());
            if step == self.fail_step {
                Err(Error::step_failed("pip install", 1, "boom".to_string()))
            } else {
                Ok(StepOutcome::default())
            }
        }
    }

    #[test]
    fn all_steps_in_bootstrap_order() {
        let ids: Vec<&str> = Step::all().iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            vec![
                "python-version",
                "ensure-venv",
                "activate-venv",
                "install-deps",
                "resolve-secret",
                "set-mode",
                "init-db",
                "launch",
            ]
        );
    }

    #[test]
    fn install_failure_skips_secret_initdb_and_launch() {
        let mut executor = FailAt {
            fail_step: Step::InstallDeps,
            executed: Vec::new(),
        };
        let result = run(&Step::all(), &mut executor);

        assert!(!result.success);
        assert_eq!(result.summary.failed, 1);
        assert_eq!(result.summary.skipped, 4);

        // Nothing after the failing step reached the executor.
        assert_eq!(
            executor.executed,
            vec!["python-version", "ensure-venv", "activate-venv", "install-deps"]
        );

        let by_id = |id: &str| {
            result
                .steps
                .iter()
                .find(|r| r.id == id)
                .unwrap()
                .status
                .clone()
        };
        assert_eq!(by_id("install-deps"), StepStatus::Failed);
        assert_eq!(by_id("resolve-secret"), StepStatus::Skipped);
        assert_eq!(by_id("init-db"), StepStatus::Skipped);
        assert_eq!(by_id("launch"), StepStatus::Skipped);
    }

    #[test]
    fn failed_step_keeps_error_code_and_exit_code() {
        let mut executor = FailAt {
            fail_step: Step::InstallDeps,
            executed: Vec::new(),
        };
        let result = run(&Step::all(), &mut executor);

        let failed = result
            .steps
            .iter()
            .find(|r| r.status == StepStatus::Failed)
            .unwrap();
        let error = failed.error.as_ref().unwrap();
        assert_eq!(error.code, "bootstrap.step_failed");
        assert_eq!(error.details["command"], "pip install");
        assert_eq!(error.details["exitCode"], 1);
    }

    #[test]
    fn clean_run_succeeds_with_full_summary() {
        struct AllOk;
        impl StepExecutor for AllOk {
            fn execute(&mut self, _step: Step) -> Result<StepOutcome> {
                Ok(StepOutcome::with_detail("ok"))
            }
        }

        let result = run(&Step::all(), &mut AllOk);
        assert!(result.success);
        assert_eq!(result.summary.total, 8);
        assert_eq!(result.summary.succeeded, 8);
        assert_eq!(result.summary.failed, 0);
    }
}
