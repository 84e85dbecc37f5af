use clap::Args;
use serde::Serialize;

use appstrap::bootstrap;
use appstrap::config;
use appstrap::db;

use super::CmdResult;

#[derive(Args)]
pub struct DbArgs {
    /// Application directory (default: current directory)
    #[arg(default_value = ".")]
    pub dir: String,
}

#[derive(Serialize)]
pub struct DbOutput {
    pub command: String,
    pub app_module: String,
    pub init_command: String,
}

/// Run only the database-initialization step, with the venv activated.
pub fn run(args: DbArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<DbOutput> {
    let app_dir = bootstrap::resolve_app_dir(&args.dir)?;
    let cfg = config::load(&app_dir)?;
    let env = bootstrap::activated_env(&app_dir, &cfg)?;

    let init_command = db::init_command(&cfg.app_module)?;
    db::run_init(&app_dir, &cfg.app_module, &env)?;

    Ok((
        DbOutput {
            command: "db.init".to_string(),
            app_module: cfg.app_module,
            init_command,
        },
        0,
    ))
}
