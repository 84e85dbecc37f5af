use clap::Args;
use serde::Serialize;

use appstrap::python::{self, PythonInfo};

use super::CmdResult;

#[derive(Args)]
pub struct PythonArgs {}

#[derive(Serialize)]
pub struct PythonOutput {
    pub command: String,
    #[serde(flatten)]
    pub python: PythonInfo,
}

pub fn run(_args: PythonArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<PythonOutput> {
    let python = python::detect_or_err()?;

    Ok((
        PythonOutput {
            command: "python.show".to_string(),
            python,
        },
        0,
    ))
}
