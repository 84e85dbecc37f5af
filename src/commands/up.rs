use clap::Args;
use serde::Serialize;

use appstrap::bootstrap::{self, BootstrapOptions, BootstrapReport};

use super::CmdResult;

#[derive(Args)]
pub struct UpArgs {
    /// Application directory (default: current directory)
    #[arg(default_value = ".")]
    pub dir: String,

    /// Listen port (overrides PORT and the configured default)
    #[arg(long)]
    pub port: Option<u16>,

    /// Worker process count (default 4)
    #[arg(long)]
    pub workers: Option<u32>,

    /// Request timeout in seconds (default 120)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show what each step would execute without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the dependency install step (fast relaunch)
    #[arg(long)]
    pub skip_install: bool,
}

#[derive(Serialize)]
pub struct UpOutput {
    pub command: String,
    #[serde(flatten)]
    pub report: BootstrapReport,
}

pub fn run(args: UpArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<UpOutput> {
    let options = BootstrapOptions {
        port: args.port,
        workers: args.workers,
        timeout: args.timeout,
        dry_run: args.dry_run,
        skip_install: args.skip_install,
    };

    let report = bootstrap::run(&args.dir, &options)?;

    // A non-dry-run that reaches this point either failed a step or ran the
    // server to completion on a non-exec platform.
    let exit_code = if report.run.success { 0 } else { 20 };

    Ok((
        UpOutput {
            command: "bootstrap.up".to_string(),
            report,
        },
        exit_code,
    ))
}
