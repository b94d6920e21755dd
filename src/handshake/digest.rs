//! Keyed digest that binds an assertion to the shared secret.
//!
//! Consumer and Provider must be configured with the same secret and the same
//! [`DigestAlgorithm`]; nothing is negotiated on the wire.

use super::error::DigestError;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::{fmt, str::FromStr};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// `hex(hmac_sha256(key = secret, msg = username))`
    #[default]
    HmacSha256,
    /// `hex(sha1(secret || username))`, the legacy concatenation digest.
    Sha1Concat,
}

impl DigestAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HmacSha256 => "hmac-sha256",
            Self::Sha1Concat => "sha1",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hmac-sha256" | "hmac" => Ok(Self::HmacSha256),
            "sha1" => Ok(Self::Sha1Concat),
            other => Err(format!("unsupported digest algorithm: {other}")),
        }
    }
}

#[derive(Clone)]
enum Keyed {
    HmacSha256(HmacSha256),
    Sha1Concat(SecretString),
}

/// Computes and verifies `auth_code` values.
#[derive(Clone)]
pub struct AssertionDigest {
    keyed: Keyed,
}

impl AssertionDigest {
    /// # Errors
    /// Returns an error if the secret is empty or cannot key the algorithm.
    pub fn new(secret: &SecretString, algorithm: DigestAlgorithm) -> Result<Self, DigestError> {
        let raw = secret.expose_secret();
        if raw.is_empty() {
            return Err(DigestError::EmptySecret);
        }

        let keyed = match algorithm {
            DigestAlgorithm::HmacSha256 => Keyed::HmacSha256(
                HmacSha256::new_from_slice(raw.as_bytes()).map_err(|_| DigestError::InvalidKey)?,
            ),
            DigestAlgorithm::Sha1Concat => Keyed::Sha1Concat(secret.clone()),
        };

        Ok(Self { keyed })
    }

    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        match &self.keyed {
            Keyed::HmacSha256(_) => DigestAlgorithm::HmacSha256,
            Keyed::Sha1Concat(_) => DigestAlgorithm::Sha1Concat,
        }
    }

    /// Lowercase hex digest for `username`. Case-sensitive on the username.
    #[must_use]
    pub fn sign(&self, username: &str) -> String {
        match &self.keyed {
            Keyed::HmacSha256(mac) => {
                let mut mac = mac.clone();
                mac.update(username.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
            Keyed::Sha1Concat(secret) => {
                let mut hasher = Sha1::new();
                hasher.update(secret.expose_secret().as_bytes());
                hasher.update(username.as_bytes());
                hex::encode(hasher.finalize())
            }
        }
    }

    /// Constant-time check of `auth_code` against the expected digest.
    #[must_use]
    pub fn verify(&self, username: &str, auth_code: &str) -> bool {
        let expected = self.sign(username);
        expected.as_bytes().ct_eq(auth_code.as_bytes()).into()
    }
}

impl fmt::Debug for AssertionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionDigest")
            .field("algorithm", &self.algorithm())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
