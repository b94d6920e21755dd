use crate::handshake::DigestAlgorithm;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn validator_digest() -> ValueParser {
    ValueParser::from(move |digest: &str| -> std::result::Result<DigestAlgorithm, String> {
        digest.parse::<DigestAlgorithm>()
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("oddnames")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("ODDNAMES_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("secret")
                .long("secret")
                .help("Secret shared by the consumer and the provider")
                .env("ODDNAMES_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("digest")
                .long("digest")
                .help("Assertion digest: hmac-sha256 or sha1 (legacy secret+username SHA-1)")
                .default_value("hmac-sha256")
                .env("ODDNAMES_DIGEST")
                .value_parser(validator_digest()),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .help("Consumer base URL used to build the callback, default: http://localhost:<port>")
                .env("ODDNAMES_PUBLIC_URL"),
        )
        .arg(
            Arg::new("provider-url")
                .long("provider-url")
                .help("Provider authorization endpoint, relative or absolute")
                .default_value(crate::handshake::PROVIDER_AUTH_PATH)
                .env("ODDNAMES_PROVIDER_URL"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("ODDNAMES_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
