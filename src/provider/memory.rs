use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::common::debug;
use crate::error::{AuthError, ProfileError};
use crate::provider::{IdentityProvider, ProfileStore, Session, SessionEvent};
use crate::session::{Profile, Role, User};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Registered credential pair.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UserEntry {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: String,
    entry: UserEntry,
}

/// In process identity provider backed by a list of registered users.
///
/// Stands in for the hosted provider in tests and demos. When wired to a
/// [`MemoryProfileStore`], sign up also creates the profile row the way the
/// hosted backend does with a database trigger.
pub struct MemoryIdentityProvider {
    users: Mutex<Vec<StoredUser>>,
    session: Mutex<Option<Session>>,
    profiles: Option<Arc<MemoryProfileStore>>,
    events: broadcast::Sender<SessionEvent>,
    counter: AtomicU64,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            users: Mutex::new(Vec::new()),
            session: Mutex::new(None),
            profiles: None,
            events,
            counter: AtomicU64::new(0),
        }
    }

    pub fn with_users(users: Vec<UserEntry>) -> Self {
        let provider = Self::new();
        for entry in users {
            provider.register(entry);
        }
        provider
    }

    /// Wire a profile store so sign up creates profile rows.
    pub fn with_profiles(mut self, profiles: Arc<MemoryProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Register a user without signing in. Returns the assigned identifier.
    pub fn register(&self, entry: UserEntry) -> String {
        let id = self.next_id();
        self.users.lock().unwrap().push(StoredUser {
            id: id.clone(),
            entry,
        });
        id
    }

    fn next_id(&self) -> String {
        format!("user-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn establish(&self, user: User) -> Session {
        let session = Session {
            user,
            issued_at: chrono::Utc::now(),
        };
        *self.session.lock().unwrap() = Some(session.clone());
        // No receiver is fine, nobody has subscribed yet.
        let _ = self
            .events
            .send(SessionEvent::SignedIn(session.clone()));
        session
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MalformedInput {
                description: "email and password must not be empty".to_owned(),
            });
        }

        let user = {
            let users = self.users.lock().unwrap();
            users
                .iter()
                .find(|stored| stored.entry.email == email && stored.entry.password == password)
                .map(|stored| User {
                    id: stored.id.clone(),
                    email: stored.entry.email.clone(),
                })
        };

        match user {
            Some(user) => Ok(self.establish(user)),
            None => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MalformedInput {
                description: "email and password must not be empty".to_owned(),
            });
        }
        if self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|stored| stored.entry.email == email)
        {
            return Err(AuthError::Provider {
                description: format!("email already registered: {}", email),
            });
        }

        let id = self.register(UserEntry {
            email: email.to_owned(),
            password: password.to_owned(),
        });

        if let Some(profiles) = &self.profiles {
            profiles.insert(Profile {
                id: id.clone(),
                display_name: display_name.to_owned(),
                role: Role::Applicant,
            });
        }

        Ok(self.establish(User {
            id,
            email: email.to_owned(),
        }))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.lock().unwrap() = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }
}

/// In process profile table.
///
/// Fetch latency and role update failures are injectable so tests can drive
/// slow fetch and best effort role assignment paths.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, Profile>>,
    fetch_delays: Mutex<HashMap<String, Duration>>,
    fetches: AtomicUsize,
    fail_role_updates: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    /// Delay subsequent fetches for the given identifier.
    pub fn set_fetch_delay(&self, id: impl Into<String>, delay: Duration) {
        self.fetch_delays.lock().unwrap().insert(id.into(), delay);
    }

    pub fn set_fail_role_updates(&self, fail: bool) {
        self.fail_role_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch_profile_by_id(&self, id: &str) -> Result<Profile, ProfileError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let delay = self.fetch_delays.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            debug!(id, ?delay, "Delay profile fetch");
            tokio::time::sleep(delay).await;
        }

        self.profiles
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound { id: id.to_owned() })
    }

    async fn update_profile_role(&self, id: &str, role: Role) -> Result<(), ProfileError> {
        if self.fail_role_updates.load(Ordering::SeqCst) {
            return Err(ProfileError::Store {
                description: "role update rejected".to_owned(),
            });
        }

        let mut profiles = self.profiles.lock().unwrap();
        match profiles.get_mut(id) {
            Some(profile) => {
                profile.role = role;
                Ok(())
            }
            None => Err(ProfileError::NotFound { id: id.to_owned() }),
        }
    }
}
