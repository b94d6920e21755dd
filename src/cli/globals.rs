use crate::handshake::DigestAlgorithm;
use secrecy::SecretString;

/// Read-only configuration shared by the consumer and the provider.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret: SecretString,
    pub digest: DigestAlgorithm,
    pub public_url: String,
    pub provider_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(
        secret: SecretString,
        digest: DigestAlgorithm,
        public_url: String,
        provider_url: String,
    ) -> Self {
        Self {
            secret,
            digest,
            public_url,
            provider_url,
        }
    }
}
