use std::rc::Rc;

use tracing::{info, warn};

use crate::model::session::{Session, User};
use crate::reactive::{Derived, Observable, Readable, Subscription};

/// Holds the current [`Session`].
#[derive(Debug, Clone)]
pub struct AuthStore {
    session: Observable<Session>,
    is_authenticated: Derived<bool>,
    current_user: Derived<Option<User>>,
}

impl Default for AuthStore {
    fn default() -> Self {
        AuthStore::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        let session = Observable::new(Session::empty());
        let is_authenticated = Derived::new(&session, |s: &Session| s.authenticated);
        let current_user = Derived::new(&session, |s: &Session| s.user.clone());
        AuthStore {
            session,
            is_authenticated,
            current_user,
        }
    }

    pub fn set_authenticated(&self, user: User, token: String) {
        info!(user = %user.username, "signed in");
        self.session.set(Session::new(user, token));
    }

    pub fn clear_authentication(&self) {
        info!("signed out");
        self.session.set(Session::empty());
    }

    /// Replace the signed-in user, keeping the token. Ignored when signed out.
    pub fn update_user(&self, user: User) {
        if !self.session.get().authenticated {
            return;
        }
        self.session.update(|s| Session {
            user: Some(user),
            ..s.clone()
        });
    }

    /// Rehydrate from a persisted snapshot. Snapshots that break the
    /// authenticated/user/token invariant are replaced by the empty session.
    pub fn restore(&self, session: Session) {
        if session.is_consistent() {
            self.session.set(session);
        } else {
            warn!("discarding inconsistent stored session");
            self.session.set(Session::empty());
        }
    }

    pub fn session(&self) -> Rc<Session> {
        self.session.get()
    }

    pub fn is_authenticated(&self) -> &Derived<bool> {
        &self.is_authenticated
    }

    pub fn current_user(&self) -> &Derived<Option<User>> {
        &self.current_user
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Session) + 'static,
    {
        self.session.subscribe(callback)
    }
}

impl Readable<Session> for AuthStore {
    fn get(&self) -> Rc<Session> {
        self.session()
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Session) + 'static,
    {
        AuthStore::subscribe(self, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: format!("u-{}", name),
            username: name.into(),
            display_name: name.to_uppercase(),
            avatar: None,
        }
    }

    #[test]
    fn starts_signed_out() {
        let auth = AuthStore::new();
        assert_eq!(*auth.session(), Session::empty());
        assert!(!*auth.is_authenticated().get());
    }

    #[test]
    fn set_and_clear() {
        let auth = AuthStore::new();
        auth.set_authenticated(user("alice"), "tok".into());
        assert!(*auth.is_authenticated().get());
        assert_eq!((*auth.current_user().get()).as_ref().map(|u| u.username.as_str()), Some("alice"));

        auth.clear_authentication();
        assert!(!*auth.is_authenticated().get());
        assert!(auth.current_user().get().is_none());
        assert!(auth.session().is_consistent());
    }

    #[test]
    fn update_user_keeps_token() {
        let auth = AuthStore::new();
        auth.set_authenticated(user("alice"), "tok".into());
        let mut renamed = user("alice");
        renamed.display_name = "Alice J.".into();
        auth.update_user(renamed);

        let session = auth.session();
        assert!(session.authenticated);
        assert_eq!(session.token.as_deref(), Some("tok"));
        assert_eq!(session.user.as_ref().unwrap().display_name, "Alice J.");
    }

    #[test]
    fn update_user_when_signed_out_is_ignored() {
        let auth = AuthStore::new();
        auth.update_user(user("bob"));
        assert_eq!(*auth.session(), Session::empty());
    }

    #[test]
    fn restore_rejects_inconsistent_session() {
        let auth = AuthStore::new();
        auth.restore(Session {
            authenticated: true,
            user: None,
            token: Some("tok".into()),
        });
        assert_eq!(*auth.session(), Session::empty());

        auth.restore(Session::new(user("bob"), "t2".into()));
        assert!(auth.session().authenticated);
    }
}
