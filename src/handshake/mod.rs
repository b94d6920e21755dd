//! Protocol core: request phase, provider authentication, callback verification.

pub mod digest;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod provider;
pub mod strategy;

pub use self::digest::{AssertionDigest, DigestAlgorithm};
pub use self::error::{AuthError, DigestError, ErrorSignal, HandshakeError};
pub use self::identity::{Credentials, IdentityRecord, UserInfo};
pub use self::provider::{Assertion, Provider, Rejected, PROVIDER_AUTH_PATH, REJECTION_MESSAGE};
pub use self::strategy::{
    CallbackParams, Handshake, HandshakeState, OnlyOddNames, Outcome, STRATEGY_NAME,
};
