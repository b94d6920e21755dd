//! Consumer-side protocol adapter.
//!
//! [`OnlyOddNames`] knows how to send a user to the provider and how to turn
//! the provider's callback into an [`IdentityRecord`]. It holds no per-user
//! state; [`Handshake`] tracks a single login attempt when the caller owns
//! both phases.

use super::{
    digest::AssertionDigest,
    encoding::append_query,
    error::{AuthError, ErrorSignal, HandshakeError},
    identity::IdentityRecord,
};
use serde::Deserialize;
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};

pub const STRATEGY_NAME: &str = "only_odd_names";

/// Parameters the provider appends to the callback URL.
#[derive(Deserialize, IntoParams, ToSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Present when the provider declined the user.
    pub error: Option<String>,
    pub username: Option<String>,
    /// Hex digest over the shared secret and `username`.
    pub auth_code: Option<String>,
}

impl CallbackParams {
    #[must_use]
    pub fn declined(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Fill fields missing from `self` with those from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            error: self.error.or(fallback.error),
            username: self.username.or(fallback.username),
            auth_code: self.auth_code.or(fallback.auth_code),
        }
    }

    #[must_use]
    pub fn asserted(username: &str, auth_code: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            auth_code: Some(auth_code.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct OnlyOddNames {
    digest: AssertionDigest,
    auth_url: String,
}

impl OnlyOddNames {
    /// `auth_url` is the provider authorization endpoint, relative or absolute.
    #[must_use]
    pub fn new(digest: AssertionDigest, auth_url: impl Into<String>) -> Self {
        Self {
            digest,
            auth_url: auth_url.into(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        STRATEGY_NAME
    }

    #[must_use]
    pub fn request_path(&self) -> String {
        format!("/auth/{}", self.name())
    }

    #[must_use]
    pub fn callback_path(&self) -> String {
        format!("/auth/{}/callback", self.name())
    }

    /// Absolute callback URL under the consumer's public base URL.
    #[must_use]
    pub fn callback_url(&self, public_url: &str) -> String {
        format!("{}{}", public_url.trim_end_matches('/'), self.callback_path())
    }

    /// Provider URL the user agent is redirected to.
    #[must_use]
    pub fn begin_auth(&self, callback_url: &str) -> String {
        let target = append_query(&self.auth_url, &[("redirect_uri", callback_url)]);
        debug!(strategy = self.name(), location = %target, "request phase");
        target
    }

    /// Verify the provider's callback.
    ///
    /// An `error` parameter wins over anything else that was sent.
    ///
    /// # Errors
    /// [`AuthError::UserAuth`] if the provider declined, [`AuthError::TrustFailure`]
    /// if the digest does not match, [`AuthError::MissingField`] if the
    /// assertion is incomplete.
    pub fn complete_auth(&self, params: CallbackParams) -> Result<IdentityRecord, AuthError> {
        if let Some(message) = params.error {
            info!(strategy = self.name(), reason = %message, "provider declined authentication");
            return Err(AuthError::UserAuth(message));
        }

        let username = params.username.ok_or(AuthError::MissingField("username"))?;
        let auth_code = params
            .auth_code
            .ok_or(AuthError::MissingField("auth_code"))?;

        if !self.digest.verify(&username, &auth_code) {
            warn!(strategy = self.name(), "assertion failed integrity check");
            return Err(AuthError::TrustFailure);
        }

        Ok(IdentityRecord::template(self.name()).with_assertion(&username, &auth_code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(IdentityRecord),
    Failure(ErrorSignal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    NotStarted,
    Redirected,
    Completed(Outcome),
}

/// One login attempt: `NotStarted -> Redirected -> Completed`.
///
/// Completed is terminal. The web layer keeps no session between the request
/// phase and the callback, so it resumes each callback with
/// [`Handshake::awaiting_callback`]; a caller that owns both phases starts
/// from [`Handshake::new`] and gets the full ordering enforced.
#[derive(Debug)]
pub struct Handshake<'a> {
    strategy: &'a OnlyOddNames,
    state: HandshakeState,
}

impl<'a> Handshake<'a> {
    #[must_use]
    pub const fn new(strategy: &'a OnlyOddNames) -> Self {
        Self {
            strategy,
            state: HandshakeState::NotStarted,
        }
    }

    /// A handshake whose request phase was served by an earlier HTTP request.
    #[must_use]
    pub const fn awaiting_callback(strategy: &'a OnlyOddNames) -> Self {
        Self {
            strategy,
            state: HandshakeState::Redirected,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// # Errors
    /// Returns an error unless the handshake has not started yet.
    pub fn begin_auth(&mut self, callback_url: &str) -> Result<String, HandshakeError> {
        match self.state {
            HandshakeState::NotStarted => {
                self.state = HandshakeState::Redirected;
                Ok(self.strategy.begin_auth(callback_url))
            }
            HandshakeState::Redirected => Err(HandshakeError::AlreadyStarted),
            HandshakeState::Completed(_) => Err(HandshakeError::AlreadyCompleted),
        }
    }

    /// # Errors
    /// Returns an error on an illegal transition or when the callback does not verify.
    pub fn complete_auth(
        &mut self,
        params: CallbackParams,
    ) -> Result<IdentityRecord, HandshakeError> {
        match self.state {
            HandshakeState::Redirected => {}
            HandshakeState::NotStarted => return Err(HandshakeError::NotRedirected),
            HandshakeState::Completed(_) => return Err(HandshakeError::AlreadyCompleted),
        }

        match self.strategy.complete_auth(params) {
            Ok(record) => {
                self.state = HandshakeState::Completed(Outcome::Success(record.clone()));
                Ok(record)
            }
            Err(e) => {
                self.state = HandshakeState::Completed(Outcome::Failure(e.signal()));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::{DigestAlgorithm, Provider};
    use secrecy::SecretString;
    use url::Url;

    const CALLBACK: &str = "http://localhost:8080/auth/only_odd_names/callback";

    fn parts(secret: &str, algorithm: DigestAlgorithm) -> anyhow::Result<(OnlyOddNames, Provider)> {
        let digest = AssertionDigest::new(&SecretString::from(secret.to_string()), algorithm)?;
        Ok((
            OnlyOddNames::new(digest.clone(), "/provider/auth"),
            Provider::new(digest),
        ))
    }

    // Read the query the provider appended to its redirect.
    fn callback_params(target: &str) -> anyhow::Result<CallbackParams> {
        let url = Url::parse(target)?;
        let mut params = CallbackParams::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => params.error = Some(value.into_owned()),
                "username" => params.username = Some(value.into_owned()),
                "auth_code" => params.auth_code = Some(value.into_owned()),
                other => anyhow::bail!("unexpected query parameter {other}"),
            }
        }
        Ok(params)
    }

    #[test]
    fn begin_auth_encodes_callback() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;
        assert_eq!(
            strategy.begin_auth(CALLBACK),
            "/provider/auth?redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fonly_odd_names%2Fcallback"
        );
        Ok(())
    }

    #[test]
    fn begin_auth_cannot_inject_parameters() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;
        let target = strategy.begin_auth("http://evil/cb?x=1&username=root");
        assert_eq!(target.matches('&').count(), 0);
        assert_eq!(target.matches('=').count(), 1);
        Ok(())
    }

    #[test]
    fn callback_url_joins_public_url() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;
        assert_eq!(strategy.callback_url("http://localhost:8080/"), CALLBACK);
        assert_eq!(strategy.callback_url("http://localhost:8080"), CALLBACK);
        assert_eq!(strategy.request_path(), "/auth/only_odd_names");
        Ok(())
    }

    #[test]
    fn round_trip_through_provider() -> anyhow::Result<()> {
        for algorithm in [DigestAlgorithm::HmacSha256, DigestAlgorithm::Sha1Concat] {
            let (strategy, provider) = parts("S", algorithm)?;
            for username in ["abc", "a", "alice", "a b c", "日本語"] {
                let target = provider.authenticate(username, CALLBACK);
                let record = strategy.complete_auth(callback_params(&target)?)?;
                assert_eq!(record.username, username);
                assert_eq!(record.user_info.name, username);
                assert_eq!(record.provider, STRATEGY_NAME);
            }
        }
        Ok(())
    }

    #[test]
    fn concrete_sha1_scenario() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::Sha1Concat)?;
        let record = strategy.complete_auth(CallbackParams::asserted(
            "abc",
            "64e2639cfcafcd2e53755abd4572977d14625459",
        ))?;
        assert_eq!(record.username, "abc");
        assert_eq!(
            record.credentials.auth_code,
            "64e2639cfcafcd2e53755abd4572977d14625459"
        );
        Ok(())
    }

    #[test]
    fn rejected_username_surfaces_as_user_auth() -> anyhow::Result<()> {
        let (strategy, provider) = parts("S", DigestAlgorithm::HmacSha256)?;
        let target = provider.authenticate("ab", CALLBACK);
        assert!(target.contains("error=Not%20Odd%20Enough"));

        let err = strategy.complete_auth(callback_params(&target)?).err();
        assert_eq!(err, Some(AuthError::UserAuth("Not Odd Enough".to_string())));
        Ok(())
    }

    #[test]
    fn tampered_code_is_trust_failure() -> anyhow::Result<()> {
        let (strategy, provider) = parts("S", DigestAlgorithm::HmacSha256)?;
        let assertion = provider.assert("abc")?;

        let mut chars: Vec<char> = assertion.auth_code.chars().collect();
        chars[0] = if chars[0] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        let err = strategy
            .complete_auth(CallbackParams::asserted("abc", &tampered))
            .err();
        assert_eq!(err, Some(AuthError::TrustFailure));
        Ok(())
    }

    #[test]
    fn swapped_username_is_trust_failure() -> anyhow::Result<()> {
        let (strategy, provider) = parts("S", DigestAlgorithm::HmacSha256)?;
        let assertion = provider.assert("abc")?;
        let err = strategy
            .complete_auth(CallbackParams::asserted("root", &assertion.auth_code))
            .err();
        assert_eq!(err.map(|e| e.signal()), Some(ErrorSignal::TrustFailure));
        Ok(())
    }

    #[test]
    fn foreign_secret_is_trust_failure() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;
        let (_, forger) = parts("not-the-secret", DigestAlgorithm::HmacSha256)?;
        let target = forger.authenticate("abc", CALLBACK);
        let err = strategy.complete_auth(callback_params(&target)?).err();
        assert_eq!(err, Some(AuthError::TrustFailure));
        Ok(())
    }

    #[test]
    fn error_wins_over_valid_assertion() -> anyhow::Result<()> {
        let (strategy, provider) = parts("S", DigestAlgorithm::HmacSha256)?;
        let assertion = provider.assert("abc")?;
        let params = CallbackParams {
            error: Some("x".to_string()),
            username: Some(assertion.username),
            auth_code: Some(assertion.auth_code),
        };
        let err = strategy.complete_auth(params).err();
        assert_eq!(err.map(|e| e.signal()), Some(ErrorSignal::UserAuth));
        Ok(())
    }

    #[test]
    fn missing_fields_are_trust_failures() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;

        let err = strategy.complete_auth(CallbackParams::default()).err();
        assert_eq!(err, Some(AuthError::MissingField("username")));

        let params = CallbackParams {
            username: Some("abc".to_string()),
            ..CallbackParams::default()
        };
        let err = strategy.complete_auth(params).err();
        assert_eq!(err, Some(AuthError::MissingField("auth_code")));
        assert_eq!(
            AuthError::MissingField("auth_code").signal(),
            ErrorSignal::TrustFailure
        );
        Ok(())
    }

    #[test]
    fn handshake_success_path() -> anyhow::Result<()> {
        let (strategy, provider) = parts("S", DigestAlgorithm::HmacSha256)?;
        let mut handshake = Handshake::new(&strategy);
        assert_eq!(handshake.state(), &HandshakeState::NotStarted);

        let target = handshake.begin_auth(CALLBACK)?;
        assert!(target.starts_with("/provider/auth?redirect_uri="));
        assert_eq!(handshake.state(), &HandshakeState::Redirected);

        let redirect = provider.authenticate("abc", CALLBACK);
        let record = handshake.complete_auth(callback_params(&redirect)?)?;
        assert_eq!(
            handshake.state(),
            &HandshakeState::Completed(Outcome::Success(record))
        );
        Ok(())
    }

    #[test]
    fn handshake_failure_is_terminal() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;
        let mut handshake = Handshake::awaiting_callback(&strategy);

        let err = handshake.complete_auth(CallbackParams::declined("x")).err();
        assert_eq!(
            err,
            Some(HandshakeError::Auth(AuthError::UserAuth("x".to_string())))
        );
        assert_eq!(
            handshake.state(),
            &HandshakeState::Completed(Outcome::Failure(ErrorSignal::UserAuth))
        );

        assert_eq!(
            handshake.complete_auth(CallbackParams::declined("x")).err(),
            Some(HandshakeError::AlreadyCompleted)
        );
        assert_eq!(
            handshake.begin_auth(CALLBACK).err(),
            Some(HandshakeError::AlreadyCompleted)
        );
        Ok(())
    }

    #[test]
    fn handshake_rejects_out_of_order_transitions() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;

        let mut fresh = Handshake::new(&strategy);
        assert_eq!(
            fresh.complete_auth(CallbackParams::default()).err(),
            Some(HandshakeError::NotRedirected)
        );
        assert_eq!(fresh.state(), &HandshakeState::NotStarted);

        fresh.begin_auth(CALLBACK)?;
        assert_eq!(
            fresh.begin_auth(CALLBACK).err(),
            Some(HandshakeError::AlreadyStarted)
        );
        Ok(())
    }

    #[test]
    fn or_prefers_own_fields() {
        let body = CallbackParams {
            auth_code: Some("body".to_string()),
            ..CallbackParams::default()
        };
        let merged = body.or(CallbackParams::asserted("abc", "query"));
        assert_eq!(merged, CallbackParams::asserted("abc", "body"));
        assert_eq!(
            CallbackParams::default().or(CallbackParams::declined("x")),
            CallbackParams::declined("x")
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Ok(mut logs) = self.0.lock() {
                logs.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn trust_failure_log_omits_callback_username() -> anyhow::Result<()> {
        let (strategy, _) = parts("S", DigestAlgorithm::HmacSha256)?;
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();

        let err = tracing::subscriber::with_default(subscriber, || {
            strategy
                .complete_auth(CallbackParams::asserted("<script>evil</script>", "00"))
                .err()
        });
        assert_eq!(err, Some(AuthError::TrustFailure));

        let output = logs
            .0
            .lock()
            .map(|logs| String::from_utf8_lossy(&logs).into_owned())
            .unwrap_or_default();
        assert!(output.contains("assertion failed integrity check"));
        assert!(!output.contains("evil"));
        Ok(())
    }
}
