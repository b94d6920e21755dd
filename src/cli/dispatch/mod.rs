use crate::cli::actions::{server, Action};
use crate::handshake::{DigestAlgorithm, PROVIDER_AUTH_PATH};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Map parsed arguments to the action to run.
/// # Errors
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        secret: matches
            .get_one::<String>("secret")
            .map(|s| SecretString::from(s.clone()))
            .ok_or_else(|| anyhow!("missing required argument: --secret"))?,
        digest: matches
            .get_one::<DigestAlgorithm>("digest")
            .copied()
            .unwrap_or_default(),
        public_url: matches.get_one::<String>("public-url").cloned(),
        provider_url: matches
            .get_one::<String>("provider-url")
            .cloned()
            .unwrap_or_else(|| PROVIDER_AUTH_PATH.to_string()),
    }))
}
