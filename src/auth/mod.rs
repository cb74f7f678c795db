//! Admin session manager.
//!
//! A client-side gate only: the credential check happens here, against a
//! configured secret, and no server ever enforces the resulting session. It
//! exists to hide admin-only UI, not to provide real access control.

use parking_lot::RwLock;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::models::AuthUser;
use crate::store::{LocalStore, AUTH_USER_KEY};

const ADMIN_USERNAME: &str = "admin";

pub struct AuthSession {
    store: LocalStore,
    admin_secret: String,
    user: RwLock<Option<AuthUser>>,
}

impl AuthSession {
    pub fn new(store: LocalStore, admin_secret: String) -> Self {
        Self {
            store,
            admin_secret,
            user: RwLock::new(None),
        }
    }

    /// Restore a previously stored session. A malformed stored value is
    /// removed and treated as absence rather than an error.
    pub fn load(&self) {
        let stored = match self.store.get(AUTH_USER_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                return;
            }
        };

        let Some(raw) = stored else { return };

        match serde_json::from_str::<AuthUser>(&raw) {
            Ok(user) => {
                *self.user.write() = Some(user);
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed stored session");
                if let Err(e) = self.store.remove(AUTH_USER_KEY) {
                    warn!(error = %e, "Failed to remove malformed session entry");
                }
            }
        }
    }

    /// Attempt an admin login. Only the literal username "admin" with the
    /// configured secret succeeds; everything else returns false with no
    /// side effects. An empty configured secret never matches.
    pub fn login(&self, username: &str, password: &str) -> bool {
        if username != ADMIN_USERNAME || self.admin_secret.is_empty() {
            return false;
        }

        // Constant-time comparison; lengths must match first
        let secret = self.admin_secret.as_bytes();
        let provided = password.as_bytes();
        if secret.len() != provided.len() || !bool::from(secret.ct_eq(provided)) {
            return false;
        }

        let user = AuthUser {
            id: "1".to_string(),
            username: ADMIN_USERNAME.to_string(),
            role: "admin".to_string(),
        };

        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(e) = self.store.set(AUTH_USER_KEY, &raw) {
                    warn!(error = %e, "Failed to persist session; it will not survive restart");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize session"),
        }

        *self.user.write() = Some(user);
        true
    }

    /// Clear the session from memory and storage.
    pub fn logout(&self) {
        *self.user.write() = None;
        if let Err(e) = self.store.remove(AUTH_USER_KEY) {
            warn!(error = %e, "Failed to remove stored session");
        }
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.user.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .read()
            .as_ref()
            .map(|u| u.role == "admin")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(dir: &std::path::Path, secret: &str) -> AuthSession {
        let store = LocalStore::open(dir).unwrap();
        AuthSession::new(store, secret.to_string())
    }

    #[test]
    fn test_login_with_correct_secret() {
        let dir = tempfile::tempdir().unwrap();
        let auth = session(dir.path(), "s3cret");

        assert!(auth.login("admin", "s3cret"));
        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
        assert_eq!(auth.user().unwrap().username, "admin");
    }

    #[test]
    fn test_login_rejects_wrong_secret_and_other_users() {
        let dir = tempfile::tempdir().unwrap();
        let auth = session(dir.path(), "s3cret");

        assert!(!auth.login("admin", "wrong"));
        assert!(!auth.login("deacon", "s3cret"));
        assert!(!auth.is_authenticated());
        assert!(!auth.is_admin());
        assert!(!auth.store.contains(AUTH_USER_KEY));
    }

    #[test]
    fn test_empty_secret_disables_login() {
        let dir = tempfile::tempdir().unwrap();
        let auth = session(dir.path(), "");
        assert!(!auth.login("admin", ""));
    }

    #[test]
    fn test_logout_clears_memory_and_storage() {
        let dir = tempfile::tempdir().unwrap();
        let auth = session(dir.path(), "s3cret");

        assert!(auth.login("admin", "s3cret"));
        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(!auth.store.contains(AUTH_USER_KEY));
    }

    #[test]
    fn test_session_restored_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let auth = session(dir.path(), "s3cret");
            assert!(auth.login("admin", "s3cret"));
        }
        let auth = session(dir.path(), "s3cret");
        auth.load();
        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
    }

    #[test]
    fn test_malformed_stored_session_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set(AUTH_USER_KEY, "{not json").unwrap();

        let auth = AuthSession::new(store.clone(), "s3cret".to_string());
        auth.load();

        assert!(!auth.is_authenticated());
        assert!(!store.contains(AUTH_USER_KEY));
    }
}
