use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{db, plan, python, secret, up};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "appstrap")]
#[command(version = VERSION)]
#[command(about = "CLI for bootstrapping and launching Python WSGI applications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the environment and launch the server
    Up(up::UpArgs),
    /// Show the bootstrap step plan without executing
    Plan(plan::PlanArgs),
    /// Detect and report the Python interpreter
    Python(python::PythonArgs),
    /// Show how SECRET_KEY would resolve
    Secret(secret::SecretArgs),
    /// Run only the database-initialization step
    Db(db::DbArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
