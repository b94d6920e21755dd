use crate::{cli::globals::GlobalArgs, handshake::DigestAlgorithm, oddnames};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub secret: SecretString,
    pub digest: DigestAlgorithm,
    pub public_url: Option<String>,
    pub provider_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the public URL is invalid, the secret is empty, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let public_url = resolve_public_url(args.public_url.as_deref(), args.port)?;

    log_startup_args(&args, &public_url);

    let globals = GlobalArgs::new(args.secret, args.digest, public_url, args.provider_url);

    debug!("Global args: {:?}", globals);

    oddnames::new(args.port, &globals).await
}

fn resolve_public_url(public_url: Option<&str>, port: u16) -> Result<String> {
    match public_url {
        Some(raw) => {
            let url = Url::parse(raw).with_context(|| format!("Invalid public URL: {raw}"))?;
            Ok(url.as_str().trim_end_matches('/').to_string())
        }
        None => Ok(format!("http://localhost:{port}")),
    }
}

fn log_startup_args(args: &Args, public_url: &str) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("public_url", public_url.to_string()),
        ("provider_url", args.provider_url.clone()),
        ("digest", args.digest.to_string()),
        (
            "secret_set",
            (!args.secret.expose_secret().is_empty()).to_string(),
        ),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", oddnames_banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn oddnames_banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    ODDNAMES_BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    hash.trim().chars().take(7).collect()
}

const ODDNAMES_BANNER: &str = r"
   1   3   5
    \  |  /
  ---+-+-+---  O D D N A M E S {VERSION}
    /  |  \
   7   9   11";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_public_url_default() {
        assert_eq!(
            resolve_public_url(None, 9090).ok().as_deref(),
            Some("http://localhost:9090")
        );
    }

    #[test]
    fn test_resolve_public_url_trims_trailing_slash() {
        assert_eq!(
            resolve_public_url(Some("https://app.tld/"), 8080).ok().as_deref(),
            Some("https://app.tld")
        );
        assert_eq!(
            resolve_public_url(Some("https://app.tld/sso/"), 8080).ok().as_deref(),
            Some("https://app.tld/sso")
        );
    }

    #[test]
    fn test_resolve_public_url_invalid() {
        assert!(resolve_public_url(Some("not a url"), 8080).is_err());
    }

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit(" abc "), "abc");
    }

    #[test]
    fn test_banner_has_version() {
        assert!(oddnames_banner().contains(env!("CARGO_PKG_VERSION")));
    }
}
