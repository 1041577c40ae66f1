use serde::{Deserialize, Serialize};

/// A demo account issued by the credential table. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Authentication state.
///
/// `authenticated` is true iff both `user` and `token` are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
}

impl Session {
    pub fn empty() -> Self {
        Session::default()
    }

    pub fn new(user: User, token: String) -> Self {
        Session {
            authenticated: true,
            user: Some(user),
            token: Some(token),
        }
    }

    /// Whether the record satisfies the authenticated/user/token invariant
    pub fn is_consistent(&self) -> bool {
        self.authenticated == (self.user.is_some() && self.token.is_some())
            && (self.authenticated || (self.user.is_none() && self.token.is_none()))
    }
}
