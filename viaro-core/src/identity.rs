use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub role: String, // e.g. "TRAVELER", "ADMIN"
}

/// Read-only view of the login session. The workflow never performs login
/// itself; it can only inspect the session and ask for a redirect.
pub trait AuthSession: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn current_user(&self) -> Option<UserProfile>;
    /// Ask the surrounding shell to route the traveler to the login screen.
    fn request_login_redirect(&self);
}

/// Session store with an in-process toggle, used by the demo wiring and tests.
pub struct MockAuthSession {
    user: Mutex<Option<UserProfile>>,
    redirects: AtomicUsize,
}

impl MockAuthSession {
    pub fn anonymous() -> Self {
        Self {
            user: Mutex::new(None),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn logged_in(username: &str) -> Self {
        let session = Self::anonymous();
        session.login(username);
        session
    }

    pub fn login(&self, username: &str) {
        tracing::info!("Session opened for {}", username);
        *self.lock_user() = Some(UserProfile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role: "TRAVELER".to_string(),
        });
    }

    pub fn logout(&self) {
        *self.lock_user() = None;
    }

    /// How many times the workflow asked for a login redirect.
    pub fn redirects_requested(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }

    fn lock_user(&self) -> MutexGuard<'_, Option<UserProfile>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthSession for MockAuthSession {
    fn is_authenticated(&self) -> bool {
        self.lock_user().is_some()
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.lock_user().clone()
    }

    fn request_login_redirect(&self) {
        tracing::info!("Redirecting traveler to the login screen");
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_login_logout_cycle() {
        let session = MockAuthSession::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());

        session.login("asha");
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().username, "asha");

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_redirects_are_counted() {
        let session = MockAuthSession::anonymous();
        session.request_login_redirect();
        session.request_login_redirect();
        assert_eq!(session.redirects_requested(), 2);
    }
}
