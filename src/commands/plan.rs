use clap::Args;
use serde::Serialize;

use appstrap::bootstrap::{self, BootstrapOptions, BootstrapReport};

use super::CmdResult;

#[derive(Args)]
pub struct PlanArgs {
    /// Application directory (default: current directory)
    #[arg(default_value = ".")]
    pub dir: String,

    /// Listen port (overrides PORT and the configured default)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Serialize)]
pub struct PlanOutput {
    pub command: String,
    #[serde(flatten)]
    pub report: BootstrapReport,
}

/// A plan is a dry run: every step reports what it would execute.
pub fn run(args: PlanArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<PlanOutput> {
    let options = BootstrapOptions {
        port: args.port,
        dry_run: true,
        ..BootstrapOptions::default()
    };

    let report = bootstrap::run(&args.dir, &options)?;

    Ok((
        PlanOutput {
            command: "bootstrap.plan".to_string(),
            report,
        },
        0,
    ))
}
