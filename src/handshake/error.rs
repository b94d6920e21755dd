use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure reason carried on the `/auth/failure` redirect.
///
/// The set is closed: any key that is not recognized collapses into
/// [`ErrorSignal::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSignal {
    /// The provider declined to authenticate the user.
    UserAuth,
    /// The assertion did not verify against the shared secret.
    TrustFailure,
    Unknown,
}

impl ErrorSignal {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::UserAuth => "user_auth",
            Self::TrustFailure => "trust_failure",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "user_auth" => Self::UserAuth,
            "trust_failure" => Self::TrustFailure,
            _ => Self::Unknown,
        }
    }

    /// Message shown to the end user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UserAuth => "Not Odd Enough!",
            Self::TrustFailure => "Something wicked this way comes. We have trust issues.",
            Self::Unknown => "Sent us up the bomb!",
        }
    }
}

impl fmt::Display for ErrorSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a callback did not produce an identity record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("provider declined authentication: {0}")]
    UserAuth(String),
    #[error("assertion failed integrity check")]
    TrustFailure,
    #[error("assertion is missing {0}")]
    MissingField(&'static str),
}

impl AuthError {
    #[must_use]
    pub const fn signal(&self) -> ErrorSignal {
        match self {
            Self::UserAuth(_) => ErrorSignal::UserAuth,
            // Without both fields there is nothing that could verify.
            Self::TrustFailure | Self::MissingField(_) => ErrorSignal::TrustFailure,
        }
    }
}

/// Illegal transitions of a [`super::Handshake`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("handshake already redirected to the provider")]
    AlreadyStarted,
    #[error("handshake has not been redirected to the provider")]
    NotRedirected,
    #[error("handshake already completed")]
    AlreadyCompleted,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl HandshakeError {
    /// Wire signal for the failure page; transition errors have no dedicated key.
    #[must_use]
    pub const fn signal(&self) -> ErrorSignal {
        match self {
            Self::Auth(e) => e.signal(),
            Self::AlreadyStarted | Self::NotRedirected | Self::AlreadyCompleted => {
                ErrorSignal::Unknown
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("shared secret must not be empty")]
    EmptySecret,
    #[error("shared secret cannot key the digest")]
    InvalidKey,
}
