//! Sign-in and identity change notifications
//!
//! The identity provider hands out an opaque user id and publishes every
//! sign-in and sign-out on a watch channel, which the orchestrator observes
//! to load or clear personal data.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// Longest accepted user id
const MAX_USER_ID_LEN: usize = 128;

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Opaque identifier issued by the provider
    pub uid: String,
}

/// Errors that can occur while signing in or out
///
/// The display strings are the messages shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("팝업이 차단되었습니다. 브라우저 설정에서 팝업을 허용해주세요.")]
    PopupBlocked,

    #[error("로그인 창이 닫혔습니다. 다시 시도해주세요.")]
    PopupClosed,

    #[error("사용자 정보가 올바르지 않습니다.")]
    InvalidCredential,

    #[error("로그인 오류: {0}")]
    Provider(String),
}

impl AuthError {
    /// Maps a provider error code and message to an `AuthError`
    pub fn from_code(code: &str, message: &str) -> Self {
        match code {
            "auth/popup-blocked" => AuthError::PopupBlocked,
            "auth/popup-closed-by-user" | "auth/cancelled-popup-request" => AuthError::PopupClosed,
            "auth/invalid-credential" | "auth/user-not-found" => AuthError::InvalidCredential,
            _ => AuthError::Provider(message.to_string()),
        }
    }
}

/// An external identity issuer
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with a provider-specific credential
    async fn sign_in(&self, credential: &str) -> Result<User, AuthError>;

    /// Signs the current user out
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The user currently signed in, if any
    fn current_user(&self) -> Option<User>;

    /// Receives the signed-in user on every change
    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}

/// Identity provider that accepts a user id as the credential
#[derive(Debug)]
pub struct LocalIdentity {
    sender: watch::Sender<Option<User>>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that a user id is non-empty, has no whitespace, and is not too long
fn validate_user_id(credential: &str) -> Result<&str, AuthError> {
    let uid = credential.trim();
    if uid.is_empty() || uid.len() > MAX_USER_ID_LEN || uid.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidCredential);
    }
    Ok(uid)
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, credential: &str) -> Result<User, AuthError> {
        let uid = validate_user_id(credential)?;
        let user = User {
            uid: uid.to_string(),
        };
        info!(uid = %user.uid, "signed in");
        self.sender.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(previous) = self.sender.send_replace(None) {
            info!(uid = %previous.uid, "signed out");
        }
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_publishes_user() {
        let identity = LocalIdentity::new();
        let mut receiver = identity.subscribe();

        let user = identity.sign_in("student42").await.unwrap();

        assert_eq!(user.uid, "student42");
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().clone(), Some(user.clone()));
        assert_eq!(identity.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_sign_out_clears_user() {
        let identity = LocalIdentity::new();
        identity.sign_in("student42").await.unwrap();
        let mut receiver = identity.subscribe();

        identity.sign_out().await.unwrap();

        assert!(receiver.has_changed().unwrap());
        assert!(receiver.borrow_and_update().is_none());
        assert!(identity.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_rejects_invalid_ids() {
        let identity = LocalIdentity::new();
        assert_eq!(identity.sign_in("").await, Err(AuthError::InvalidCredential));
        assert_eq!(identity.sign_in("two words").await, Err(AuthError::InvalidCredential));
        let long = "x".repeat(MAX_USER_ID_LEN + 1);
        assert_eq!(identity.sign_in(&long).await, Err(AuthError::InvalidCredential));
        assert!(identity.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_trims_credential() {
        let identity = LocalIdentity::new();
        let user = identity.sign_in("  student42 ").await.unwrap();
        assert_eq!(user.uid, "student42");
    }

    #[test]
    fn test_error_codes_map_to_korean_messages() {
        assert_eq!(
            AuthError::from_code("auth/popup-blocked", "").to_string(),
            "팝업이 차단되었습니다. 브라우저 설정에서 팝업을 허용해주세요."
        );
        assert_eq!(
            AuthError::from_code("auth/popup-closed-by-user", "").to_string(),
            "로그인 창이 닫혔습니다. 다시 시도해주세요."
        );
        assert_eq!(
            AuthError::from_code("auth/network-request-failed", "network down").to_string(),
            "로그인 오류: network down"
        );
    }
}
