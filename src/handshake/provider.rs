//! The identity provider: authenticates the end user and issues assertions.
//!
//! ```text
//! Form    -> GET  /provider/auth?redirect_uri=:redirect_uri
//! Submit  -> POST /provider/auth   (redirect_uri, username)
//!
//! Success -> :redirect_uri?auth_code=:auth_code&username=:username
//! Failure -> :redirect_uri?error=Not%20Odd%20Enough
//! ```

use super::{
    digest::AssertionDigest,
    encoding::{append_query, escape_html},
};
use thiserror::Error;
use tracing::info;

/// Path the provider's login form posts back to.
pub const PROVIDER_AUTH_PATH: &str = "/provider/auth";

/// Message sent back in `error` when the business rule rejects a user.
pub const REJECTION_MESSAGE: &str = "Not Odd Enough";

/// The business rule declined the username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", REJECTION_MESSAGE)]
pub struct Rejected;

/// Claim about a user, bound to the shared secret through `auth_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub username: String,
    pub auth_code: String,
}

impl Assertion {
    #[must_use]
    pub fn query_pairs(&self) -> [(&str, &str); 2] {
        [
            ("auth_code", self.auth_code.as_str()),
            ("username", self.username.as_str()),
        ]
    }
}

/// Business rule: a (trimmed) username is accepted iff it has an odd number
/// of characters. The empty name has length zero and is rejected.
#[must_use]
pub fn accepts(username: &str) -> bool {
    username.chars().count() % 2 == 1
}

#[derive(Debug, Clone)]
pub struct Provider {
    digest: AssertionDigest,
    form_action: String,
}

impl Provider {
    #[must_use]
    pub fn new(digest: AssertionDigest) -> Self {
        Self {
            digest,
            form_action: PROVIDER_AUTH_PATH.to_string(),
        }
    }

    /// Override where the login form posts to (e.g. when mounted behind a prefix).
    #[must_use]
    pub fn with_form_action(mut self, form_action: impl Into<String>) -> Self {
        self.form_action = form_action.into();
        self
    }

    /// Trim, apply the business rule and sign.
    ///
    /// # Errors
    /// Returns [`Rejected`] when the username is not accepted.
    pub fn assert(&self, username: &str) -> Result<Assertion, Rejected> {
        let username = username.trim();

        if !accepts(username) {
            info!(length = username.chars().count(), "username rejected");
            return Err(Rejected);
        }

        info!(username, "username accepted");

        Ok(Assertion {
            username: username.to_string(),
            auth_code: self.digest.sign(username),
        })
    }

    /// Redirect target for the user agent after a login attempt.
    #[must_use]
    pub fn authenticate(&self, username: &str, redirect_uri: &str) -> String {
        match self.assert(username) {
            Ok(assertion) => append_query(redirect_uri, &assertion.query_pairs()),
            Err(Rejected) => append_query(redirect_uri, &[("error", REJECTION_MESSAGE)]),
        }
    }

    /// Login form carrying `redirect_uri` in a hidden field.
    #[must_use]
    pub fn render_login_form(&self, redirect_uri: &str) -> String {
        format!(
            r"<form action='{action}' method='post'>
  <input type='hidden' name='redirect_uri' value='{redirect_uri}' />
  <label for='username'>Who are you?</label>
  <input id='username' type='text' name='username' />
  <input type='submit' value='Sign In' />
</form>
",
            action = escape_html(&self.form_action),
            redirect_uri = escape_html(redirect_uri),
        )
    }
}
