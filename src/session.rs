//! Signed-in session state. Authentication proper lives with the remote
//! service; this tracks whether a user is signed in and who, which gates
//! plan mirroring and the bulk-replay endpoints.

use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<UserSession>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, email: String, name: String) {
        *self.current.write().await = Some(UserSession { email, name });
    }

    pub async fn sign_out(&self) {
        *self.current.write().await = None;
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn current(&self) -> Option<UserSession> {
        self.current.read().await.clone()
    }
}
