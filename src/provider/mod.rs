mod memory;
pub use memory::{MemoryIdentityProvider, MemoryProfileStore, UserEntry};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::common::Time;
use crate::error::{AuthError, ProfileError};
use crate::session::{Profile, Role, User};

/// Session issued by the identity provider.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub issued_at: Time,
}

/// Notification emitted by the identity provider on auth state changes.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

/// Contract of the hosted identity provider.
///
/// `subscribe` must keep emitting events in the order they occur; the
/// subscription ends when the receiver is dropped.
#[async_trait]
pub trait IdentityProvider {
    /// One shot read of the currently persisted session, used at startup.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Contract of the profile table behind the identity provider.
#[async_trait]
pub trait ProfileStore {
    async fn fetch_profile_by_id(&self, id: &str) -> Result<Profile, ProfileError>;

    async fn update_profile_role(&self, id: &str, role: Role) -> Result<(), ProfileError>;
}
