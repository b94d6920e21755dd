use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalized result of a successful handshake.
///
/// Every strategy starts from [`IdentityRecord::template`] and merges in what
/// its provider asserted.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    pub provider: String,
    pub uid: Option<String>,
    pub username: String,
    pub user_info: UserInfo,
    pub credentials: Credentials,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub auth_code: String,
}

impl IdentityRecord {
    /// Empty record tagged with the strategy that will fill it.
    #[must_use]
    pub fn template(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            ..Self::default()
        }
    }

    /// Merge a verified assertion into the record.
    #[must_use]
    pub fn with_assertion(mut self, username: &str, auth_code: &str) -> Self {
        self.uid = Some(username.to_string());
        self.username = username.to_string();
        self.user_info.name = username.to_string();
        self.credentials.auth_code = auth_code.to_string();
        self
    }
}
