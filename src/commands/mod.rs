pub type CmdResult<T> = appstrap::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod db;
pub mod plan;
pub mod python;
pub mod secret;
pub mod up;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (appstrap::Result<serde_json::Value>, i32) {
    crate::tty::status("appstrap is working...");

    match command {
        crate::Commands::Up(args) => dispatch!(args, global, up),
        crate::Commands::Plan(args) => dispatch!(args, global, plan),
        crate::Commands::Python(args) => dispatch!(args, global, python),
        crate::Commands::Secret(args) => dispatch!(args, global, secret),
        crate::Commands::Db(args) => dispatch!(args, global, db),
    }
}
