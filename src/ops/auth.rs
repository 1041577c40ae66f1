use std::thread;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::model::session::User;
use crate::store::AuthStore;

/// Result of a credential check. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { user: User, token: String },
    Failure { error: String },
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }
}

struct Credential {
    user: User,
    password: &'static str,
}

/// Demo credential table with an artificial response delay.
pub struct MockAuthService {
    credentials: Vec<Credential>,
    delay: Duration,
}

impl std::fmt::Debug for MockAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAuthService")
            .field("users", &self.credentials.len())
            .field("delay", &self.delay)
            .finish()
    }
}

fn demo_user(id: &str, username: &str, display_name: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
        avatar: None,
    }
}

impl MockAuthService {
    pub fn new(delay: Duration) -> Self {
        let credentials = vec![
            Credential {
                user: demo_user("u-alice", "alice", "Alice Johnson"),
                password: "alice123",
            },
            Credential {
                user: demo_user("u-bob", "bob", "Bob Smith"),
                password: "bob123",
            },
            Credential {
                user: demo_user("u-demo", "demo", "Demo User"),
                password: "demo123",
            },
        ];
        MockAuthService { credentials, delay }
    }

    /// Check a username/password pair against the table.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthOutcome {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        match self
            .credentials
            .iter()
            .find(|c| c.user.username == username && c.password == password)
        {
            Some(c) => {
                debug!(username, "credentials accepted");
                AuthOutcome::Success {
                    user: c.user.clone(),
                    token: format!("demo-token-{}", Uuid::new_v4().simple()),
                }
            }
            None => {
                debug!(username, "credentials rejected");
                AuthOutcome::Failure {
                    error: "Invalid username or password".to_string(),
                }
            }
        }
    }

    /// Every user in the directory
    pub fn users(&self) -> Vec<User> {
        self.credentials.iter().map(|c| c.user.clone()).collect()
    }

    pub fn find_user(&self, id_or_username: &str) -> Option<User> {
        self.credentials
            .iter()
            .map(|c| &c.user)
            .find(|u| u.id == id_or_username || u.username == id_or_username)
            .cloned()
    }
}

/// Check credentials and, on success, sign the store in.
/// Concurrent logins are not guarded: the last one to finish wins.
pub fn login(auth: &AuthStore, service: &MockAuthService, username: &str, password: &str) -> AuthOutcome {
    let outcome = service.authenticate(username, password);
    match &outcome {
        AuthOutcome::Success { user, token } => {
            auth.set_authenticated(user.clone(), token.clone());
        }
        AuthOutcome::Failure { error } => {
            info!(username, error = %error, "sign-in failed");
        }
    }
    outcome
}

pub fn logout(auth: &AuthStore) {
    auth.clear_authentication();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MockAuthService {
        MockAuthService::new(Duration::ZERO)
    }

    #[test]
    fn valid_credentials_succeed() {
        let outcome = service().authenticate("alice", "alice123");
        match outcome {
            AuthOutcome::Success { user, token } => {
                assert_eq!(user.id, "u-alice");
                assert!(token.starts_with("demo-token-"));
            }
            AuthOutcome::Failure { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[test]
    fn wrong_password_fails_without_error() {
        let outcome = service().authenticate("alice", "nope");
        assert_eq!(
            outcome,
            AuthOutcome::Failure {
                error: "Invalid username or password".into()
            }
        );
    }

    #[test]
    fn tokens_are_unique_per_login() {
        let s = service();
        let a = s.authenticate("bob", "bob123");
        let b = s.authenticate("bob", "bob123");
        assert_ne!(a, b);
    }

    #[test]
    fn login_updates_store_only_on_success() {
        let auth = AuthStore::new();
        let s = service();
        assert!(!login(&auth, &s, "demo", "wrong").is_success());
        assert!(!auth.session().authenticated);

        assert!(login(&auth, &s, "demo", "demo123").is_success());
        assert_eq!(auth.session().user.as_ref().unwrap().username, "demo");

        logout(&auth);
        assert!(!auth.session().authenticated);
    }

    #[test]
    fn last_login_wins() {
        let auth = AuthStore::new();
        let s = service();
        login(&auth, &s, "alice", "alice123");
        login(&auth, &s, "bob", "bob123");
        assert_eq!(auth.session().user.as_ref().unwrap().id, "u-bob");
    }

    #[test]
    fn find_user_by_id_or_username() {
        let s = service();
        assert_eq!(s.find_user("u-bob").unwrap().username, "bob");
        assert_eq!(s.find_user("alice").unwrap().id, "u-alice");
        assert!(s.find_user("mallory").is_none());
        assert_eq!(s.users().len(), 3);
    }
}
