//! Bootstrap orchestration: wires the step engine to the real steps.
//!
//! Contract: given a working directory containing a dependency manifest and
//! an external application entry point, produce a running server process
//! bound to a configurable port, or stop at the first failing step. On Unix
//! a fully successful run never returns from the launch step (the process
//! image is replaced by the server).

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{self, AppConfig};
use crate::db;
use crate::engine::{self, RunResult, Step, StepExecutor, StepOutcome};
use crate::environment::BootstrapEnv;
use crate::error::{Error, Result};
use crate::install;
use crate::launch::{self, ServerSpec};
use crate::python::{self, PythonInfo};
use crate::secret::{self, SecretSource, SECRET_KEY_VAR};
use crate::venv::{self, VenvStatus};

#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    pub port: Option<u16>,
    pub workers: Option<u32>,
    pub timeout: Option<u64>,
    pub dry_run: bool,
    pub skip_install: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapReport {
    pub app_dir: String,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<PythonInfo>,
    pub port: u16,
    pub server: ServerSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_source: Option<SecretSource>,
    #[serde(flatten)]
    pub run: RunResult,
}

/// Expand and validate the application directory argument.
pub fn resolve_app_dir(dir: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(dir).to_string();
    let path = PathBuf::from(expanded);
    if !path.is_dir() {
        return Err(Error::validation_invalid_argument(
            "dir",
            format!("Not a directory: {}", path.display()),
        ));
    }
    Ok(path)
}

/// Run the full bootstrap sequence in `dir`.
pub fn run(dir: &str, options: &BootstrapOptions) -> Result<BootstrapReport> {
    let app_dir = resolve_app_dir(dir)?;
    let config = config::load(&app_dir)?;
    db::validate_module_name(&config.app_module)?;

    // Surface a missing manifest before any step runs, so the error reaches
    // the caller as a coded error rather than a failed install step.
    if !options.skip_install {
        let manifest_path = app_dir.join(&config.manifest);
        if !manifest_path.is_file() {
            return Err(Error::manifest_not_found(
                manifest_path.display().to_string(),
            ));
        }
    }

    let port = launch::resolve_port(
        options.port,
        std::env::var("PORT").ok().as_deref(),
        config.default_port,
    )?;

    let mut executor = BootstrapExecutor {
        app_dir: app_dir.clone(),
        config,
        options: options.clone(),
        env: BootstrapEnv::new(),
        python: None,
        secret_source: None,
        port,
    };

    let run = engine::run(&Step::all(), &mut executor);
    let server = ServerSpec::from_config(
        &executor.config,
        port,
        options.workers,
        options.timeout,
    );

    Ok(BootstrapReport {
        app_dir: app_dir.display().to_string(),
        dry_run: options.dry_run,
        python: executor.python,
        port,
        server,
        secret_source: executor.secret_source,
        run,
    })
}

struct BootstrapExecutor {
    app_dir: PathBuf,
    config: AppConfig,
    options: BootstrapOptions,
    env: BootstrapEnv,
    python: Option<PythonInfo>,
    secret_source: Option<SecretSource>,
    port: u16,
}

impl BootstrapExecutor {
    fn python_program(&self) -> &str {
        self.python
            .as_ref()
            .map(|p| p.program.as_str())
            .unwrap_or("python3")
    }

    fn venv_bin(&self) -> PathBuf {
        venv::bin_dir(&venv::venv_path(&self.app_dir, &self.config.venv_dir))
    }
}

impl StepExecutor for BootstrapExecutor {
    fn execute(&mut self, step: Step) -> Result<StepOutcome> {
        match step {
            // Informational only: a missing interpreter surfaces as a tool
            // failure at venv creation, not here.
            Step::PythonVersion => match python::detect() {
                Some(info) => {
                    log_status!("bootstrap", "Using {} ({})", info.version, info.program);
                    let detail = format!("Python {} ({})", info.version, info.program);
                    self.python = Some(info);
                    Ok(StepOutcome::with_detail(detail))
                }
                None => {
                    log_status!("bootstrap", "No Python interpreter found; continuing");
                    Ok(StepOutcome::with_detail("interpreter not found"))
                }
            },

            Step::EnsureVenv => {
                if self.options.dry_run {
                    let detail = if venv::is_present(&self.app_dir, &self.config.venv_dir) {
                        format!("{} present, reused", self.config.venv_dir)
                    } else {
                        format!(
                            "would run: {}",
                            venv::create_command(self.python_program(), &self.config.venv_dir)
                        )
                    };
                    return Ok(StepOutcome::with_detail(detail));
                }

                let program = self.python_program().to_string();
                let status =
                    venv::ensure(&self.app_dir, &self.config.venv_dir, &program, &self.env)?;
                Ok(StepOutcome::with_detail(match status {
                    VenvStatus::Created => "created",
                    VenvStatus::Reused => "reused",
                }))
            }

            Step::ActivateVenv => {
                let bin = self.venv_bin();
                self.env.activate_venv(&bin);
                Ok(StepOutcome::with_detail(format!(
                    "PATH += {}",
                    bin.display()
                )))
            }

            Step::InstallDeps => {
                if self.options.skip_install {
                    return Ok(StepOutcome::with_detail("skipped (--skip-install)"));
                }
                if self.options.dry_run {
                    return Ok(StepOutcome::with_detail(format!(
                        "would run: {}",
                        install::commands(&self.config).join(" && ")
                    )));
                }
                install::run(&self.app_dir, &self.config, &self.env)?;
                Ok(StepOutcome::with_detail(format!(
                    "{} + {}",
                    self.config.manifest, self.config.server_package
                )))
            }

            // Resolution only touches the process-local overlay, so it runs
            // under --dry-run too (the report then shows the real source).
            Step::ResolveSecret => {
                let existing = std::env::var(SECRET_KEY_VAR).ok();
                let resolution = secret::resolve(existing);
                if resolution.source == SecretSource::Generated && !self.options.dry_run {
                    log_status!(
                        "bootstrap",
                        "Generated ephemeral SECRET_KEY (not persisted; sessions reset on redeploy)"
                    );
                }
                self.secret_source = Some(resolution.source);
                self.env.export(SECRET_KEY_VAR, resolution.value);
                Ok(StepOutcome::with_detail(
                    match (resolution.source, self.options.dry_run) {
                        (SecretSource::Environment, _) => "from environment",
                        (SecretSource::Generated, true) => "would generate 64-char hex value",
                        (SecretSource::Generated, false) => "generated (ephemeral)",
                    },
                ))
            }

            Step::SetMode => {
                self.env.export("FLASK_ENV", "production");
                self.env.export("PORT", self.port.to_string());
                Ok(StepOutcome::with_detail("FLASK_ENV=production"))
            }

            Step::InitDb => {
                let cmd = db::init_command(&self.config.app_module)?;
                if self.options.dry_run {
                    return Ok(StepOutcome::with_detail(format!("would run: {}", cmd)));
                }
                db::run_init(&self.app_dir, &self.config.app_module, &self.env)?;
                Ok(StepOutcome::with_detail(cmd))
            }

            Step::Launch => {
                let spec = ServerSpec::from_config(
                    &self.config,
                    self.port,
                    self.options.workers,
                    self.options.timeout,
                );
                if self.options.dry_run {
                    return Ok(StepOutcome::with_detail(format!(
                        "would exec: {}",
                        spec.command_line()
                    )));
                }

                // On Unix this only returns on exec failure; on Windows the
                // server runs to completion and we surface its exit code.
                let code = launch::launch(&spec, &self.app_dir, &self.env)?;
                if code != 0 {
                    return Err(Error::launch_failed(
                        spec.command_line(),
                        format!("server exited with code {}", code),
                    ));
                }
                Ok(StepOutcome::with_detail(spec.command_line()))
            }
        }
    }
}

/// Build the activated environment for a standalone step (e.g. `appstrap db`)
/// without running the provisioning steps. The venv must already exist.
pub fn activated_env(app_dir: &Path, config: &AppConfig) -> Result<BootstrapEnv> {
    if !venv::is_present(app_dir, &config.venv_dir) {
        return Err(Error::validation_invalid_argument(
            "dir",
            format!("No virtualenv at {}/{}", app_dir.display(), config.venv_dir),
        )
        .with_hint("Run 'appstrap up' to provision the environment first"));
    }

    let mut env = BootstrapEnv::new();
    env.activate_venv(&venv::bin_dir(&venv::venv_path(app_dir, &config.venv_dir)));
    env.export("FLASK_ENV", "production");
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StepStatus;

    fn write_manifest(dir: &Path) {
        std::fs::write(dir.join("requirements.txt"), "flask\n").unwrap();
    }

    #[test]
    fn dry_run_walks_all_steps_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());

        let options = BootstrapOptions {
            dry_run: true,
            ..BootstrapOptions::default()
        };
        let report = run(&dir.path().display().to_string(), &options).unwrap();

        assert!(report.run.success);
        assert_eq!(report.run.summary.total, 8);
        assert!(!venv::is_present(dir.path(), "venv"));

        let launch_step = report.run.steps.iter().find(|s| s.id == "launch").unwrap();
        assert_eq!(launch_step.status, StepStatus::Success);
        assert!(launch_step.detail.as_ref().unwrap().contains("0.0.0.0"));
    }

    #[test]
    fn dry_run_reports_resolved_port() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());

        let report = run(
            &dir.path().display().to_string(),
            &BootstrapOptions {
                dry_run: true,
                ..BootstrapOptions::default()
            },
        )
        .unwrap();

        // 5000 unless the surrounding environment carries a PORT override.
        let expected = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        assert_eq!(report.port, expected);
        assert_eq!(report.server.bind, format!("0.0.0.0:{}", expected));
    }

    #[test]
    fn port_flag_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());

        let report = run(
            &dir.path().display().to_string(),
            &BootstrapOptions {
                port: Some(8080),
                dry_run: true,
                ..BootstrapOptions::default()
            },
        )
        .unwrap();

        assert_eq!(report.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn missing_manifest_fails_before_any_step() {
        let dir = tempfile::tempdir().unwrap();

        let err = run(
            &dir.path().display().to_string(),
            &BootstrapOptions {
                dry_run: true,
                ..BootstrapOptions::default()
            },
        )
        .unwrap_err();

        assert_eq!(err.code, crate::ErrorCode::ManifestNotFound);
        assert!(err.message.contains("requirements.txt"));
        assert!(!venv::is_present(dir.path(), "venv"));
    }

    #[test]
    fn skip_install_does_not_require_manifest() {
        let dir = tempfile::tempdir().unwrap();

        let report = run(
            &dir.path().display().to_string(),
            &BootstrapOptions {
                dry_run: true,
                skip_install: true,
                ..BootstrapOptions::default()
            },
        )
        .unwrap();

        assert!(report.run.success);
    }

    #[test]
    fn run_exports_production_mode_and_secret() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());

        let mut executor = BootstrapExecutor {
            app_dir: dir.path().to_path_buf(),
            config: AppConfig::default(),
            options: BootstrapOptions {
                dry_run: true,
                ..BootstrapOptions::default()
            },
            env: BootstrapEnv::new(),
            python: None,
            secret_source: None,
            port: 5000,
        };
        let result = engine::run(&Step::all(), &mut executor);

        assert!(result.success);
        assert_eq!(executor.env.get("FLASK_ENV"), Some("production"));

        let secret = executor.env.get(SECRET_KEY_VAR).unwrap();
        assert!(!secret.is_empty());
        if executor.secret_source == Some(SecretSource::Generated) {
            assert_eq!(secret.len(), 64);
            assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        }

        // Both exports land before the init-db step runs.
        let pos = |id: &str| result.steps.iter().position(|s| s.id == id).unwrap();
        assert!(pos("resolve-secret") < pos("init-db"));
        assert!(pos("set-mode") < pos("init-db"));
    }

    #[test]
    fn missing_dir_is_validation_error() {
        let err = run("/no/such/appstrap/dir", &BootstrapOptions::default()).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn activated_env_requires_existing_venv() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();

        let err = activated_env(dir.path(), &config).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidArgument);

        std::fs::create_dir(dir.path().join("venv")).unwrap();
        let env = activated_env(dir.path(), &config).unwrap();
        assert_eq!(env.get("FLASK_ENV"), Some("production"));
        assert!(env.get("PATH").unwrap().contains("venv"));
    }
}
