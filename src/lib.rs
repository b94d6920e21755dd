//! # oddnames
//!
//! A relying party (the **Consumer**) and an identity **Provider** that
//! authenticate users with a redirect handshake:
//!
//! 1. The Consumer sends the user agent to the Provider's authorization
//!    endpoint with a `redirect_uri` pointing back at its callback.
//! 2. The Provider authenticates the user (a username is accepted iff its
//!    trimmed length is odd) and redirects back with an assertion
//!    (`username` + `auth_code`) or an `error`.
//! 3. The Consumer recomputes the `auth_code` from the shared secret and only
//!    builds an [`handshake::IdentityRecord`] when both digests match.
//!
//! The protocol pieces live in [`handshake`] and do not depend on the web
//! framework. [`oddnames`] wires them into an `axum` router, and [`cli`]
//! handles configuration and telemetry.
//!
//! ## Digest
//!
//! Both parties derive `auth_code` from the same secret and algorithm.
//! `hmac-sha256` is the default; `sha1` reproduces the legacy
//! `hex(sha1(secret || username))` scheme for interoperability with older
//! providers. Comparison is constant-time.

pub mod cli;
pub mod handshake;
pub mod oddnames;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
