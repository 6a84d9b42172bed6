//! Authenticated identity and the bearer credential.
//!
//! The credential lives behind [`TokenStore`] so the gateways and the session share one
//! source of truth, and tests can swap the on-disk file for memory.

use crate::api::ApiError;
use crate::api::auth::AuthGateway;
use crate::models::{LoginRequest, RegisterRequest, User};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Single credential string in a file under the data directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RefCell::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.token.borrow_mut().take();
        Ok(())
    }
}

pub struct SessionStore {
    tokens: Rc<dyn TokenStore>,
    user: Option<User>,
}

impl SessionStore {
    pub fn new(tokens: Rc<dyn TokenStore>) -> Self {
        Self { tokens, user: None }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// True when a user signed in this run or a credential survived from an earlier one.
    /// The credential itself is not validated here; the server rejects stale ones.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() || self.tokens.load().is_some()
    }

    pub fn login(
        &mut self,
        gateway: &dyn AuthGateway,
        credentials: &LoginRequest,
    ) -> Result<&User, ApiError> {
        let response = gateway.login(credentials)?;
        self.establish(response)
    }

    pub fn register(
        &mut self,
        gateway: &dyn AuthGateway,
        data: &RegisterRequest,
    ) -> Result<&User, ApiError> {
        let response = gateway.register(data)?;
        self.establish(response)
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("failed to clear stored credential: {e}");
        }
        if let Some(user) = self.user.take() {
            tracing::info!(username = %user.username, "signed out");
        }
    }

    fn establish(&mut self, response: crate::models::AuthResponse) -> Result<&User, ApiError> {
        // A session that cannot be persisted still works for this run.
        if let Err(e) = self.tokens.save(&response.token) {
            tracing::warn!("failed to persist credential: {e}");
        }
        let user = User::from(response);
        tracing::info!(username = %user.username, "signed in");
        Ok(self.user.insert(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthResponse;
    use std::cell::Cell;

    struct FakeAuth {
        fail: bool,
        calls: Cell<usize>,
    }

    impl FakeAuth {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: Cell::new(0),
            }
        }

        fn respond(&self, username: &str) -> Result<AuthResponse, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ApiError::Status {
                    status: 401,
                    body: "bad credentials".to_string(),
                });
            }
            Ok(AuthResponse {
                token: format!("token-{username}"),
                id: "u-1".to_string(),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                roles: vec!["ROLE_USER".to_string()],
            })
        }
    }

    impl AuthGateway for FakeAuth {
        fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
            self.respond(&credentials.username)
        }

        fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
            self.respond(&data.username)
        }
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            username: "ana".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn login_persists_token_and_user() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let mut session = SessionStore::new(tokens.clone());
        assert!(!session.is_authenticated());

        let user = session.login(&FakeAuth::new(false), &login_request()).unwrap();
        assert_eq!(user.username, "ana");
        assert!(user.roles.contains("ROLE_USER"));
        assert_eq!(tokens.load().as_deref(), Some("token-ana"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn failed_login_propagates_and_leaves_state_alone() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let mut session = SessionStore::new(tokens.clone());
        let gateway = FakeAuth::new(true);

        let err = session.login(&gateway, &login_request()).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 401, .. }));
        assert_eq!(gateway.calls.get(), 1);
        assert!(tokens.load().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn register_establishes_session_like_login() {
        let mut session = SessionStore::new(Rc::new(MemoryTokenStore::default()));
        let data = RegisterRequest {
            username: "bo".to_string(),
            email: "bo@example.com".to_string(),
            password: "pw".to_string(),
        };
        session.register(&FakeAuth::new(false), &data).unwrap();
        assert_eq!(session.user().map(|u| u.email.as_str()), Some("bo@example.com"));
    }

    #[test]
    fn persisted_token_counts_as_authenticated_before_rehydration() {
        let session = SessionStore::new(Rc::new(MemoryTokenStore::with_token("left-over")));
        assert!(session.user().is_none());
        assert!(session.is_authenticated());
    }

    #[test]
    fn logout_clears_token_and_user() {
        let tokens = Rc::new(MemoryTokenStore::default());
        let mut session = SessionStore::new(tokens.clone());
        session.login(&FakeAuth::new(false), &login_request()).unwrap();

        session.logout();
        assert!(tokens.load().is_none());
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("data").join("auth_token"));
        assert!(store.load().is_none());

        store.save("abc.def").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc.def"));

        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }
}
