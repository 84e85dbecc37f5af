use clap::Args;
use serde::Serialize;

use appstrap::secret::{self, SecretSource, SECRET_KEY_VAR};

use super::CmdResult;

#[derive(Args)]
pub struct SecretArgs {}

#[derive(Serialize)]
pub struct SecretOutput {
    pub command: String,
    pub source: SecretSource,
    /// Only present for freshly generated values; an environment-provided
    /// secret is never echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub length: usize,
}

pub fn run(_args: SecretArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<SecretOutput> {
    let resolution = secret::resolve(std::env::var(SECRET_KEY_VAR).ok());

    let length = resolution.value.len();
    let value = match resolution.source {
        SecretSource::Generated => Some(resolution.value),
        SecretSource::Environment => None,
    };

    Ok((
        SecretOutput {
            command: "secret.show".to_string(),
            source: resolution.source,
            value,
            length,
        },
        0,
    ))
}
