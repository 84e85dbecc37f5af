//! Local command execution primitives.
//!
//! Bootstrap steps shell out to `python`, `pip`, and the WSGI server. All of
//! them run through here so the venv PATH overlay and working directory are
//! applied uniformly.

use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

fn apply_context(cmd: &mut Command, current_dir: Option<&Path>, env: &[(String, String)]) {
    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }
    cmd.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
}

/// Execute a shell command, capturing stdout and stderr.
pub fn run_shell(
    command: &str,
    current_dir: Option<&Path>,
    env: &[(String, String)],
) -> CommandOutput {
    let mut cmd = shell_command(command);
    apply_context(&mut cmd, current_dir, env);

    match cmd.output() {
        Ok(out) => CommandOutput {
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            success: out.status.success(),
            exit_code: out.status.code().unwrap_or(-1),
        },
        Err(e) => CommandOutput {
            stdout: String::new(),
            stderr: format!("Command error: {}", e),
            success: false,
            exit_code: -1,
        },
    }
}

/// Execute a shell command with stdout/stderr passed through to the terminal.
/// Returns only exit status, not captured output. Used for long installs
/// where progress output matters.
pub fn run_shell_passthrough(
    command: &str,
    current_dir: Option<&Path>,
    env: &[(String, String)],
) -> CommandOutput {
    let mut cmd = shell_command(command);
    apply_context(&mut cmd, current_dir, env);

    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    match cmd.status() {
        Ok(status) => CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            success: status.success(),
            exit_code: status.code().unwrap_or(-1),
        },
        Err(e) => CommandOutput {
            stdout: String::new(),
            stderr: format!("Command error: {}", e),
            success: false,
            exit_code: -1,
        },
    }
}

/// Run a program directly (no shell) and return trimmed stdout on success.
/// Returns None when the program is missing or exits non-zero. Used for
/// interpreter probing where absence is an expected outcome.
pub fn probe(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    if !output.status.success() {
        return None;
    }

    // `python --version` historically wrote to stderr; accept either stream.
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return Some(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        None
    } else {
        Some(stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_shell_captures_output() {
        let out = run_shell("echo hello", None, &[]);
        assert!(out.success);
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn run_shell_reports_exit_code() {
        let out = run_shell("exit 3", None, &[]);
        assert!(!out.success);
        assert_eq!(out.exit_code, 3);
    }

    #[test]
    fn run_shell_applies_env_overlay() {
        let env = vec![("APPSTRAP_TEST_VAR".to_string(), "overlay".to_string())];
        let out = run_shell("echo \"$APPSTRAP_TEST_VAR\"", None, &env);
        assert_eq!(out.stdout.trim(), "overlay");
    }

    #[test]
    fn probe_missing_program_is_none() {
        assert!(probe("appstrap-definitely-not-a-program", &["--version"]).is_none());
    }
}
