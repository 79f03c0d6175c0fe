use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use crate::common::{debug, error, info, trace, warn, ErrorKind, Result};
use crate::config::SessionConfig;
use crate::error::ProfileError;
use crate::provider::{IdentityProvider, ProfileStore, Session, SessionEvent};
use crate::session::command::{Command, SignIn, SignUp, Work};
use crate::session::{Principal, Profile, SessionHandle, SessionState};

pub struct Builder {
    identity: Arc<dyn IdentityProvider + Send + Sync>,
    profiles: Arc<dyn ProfileStore + Send + Sync>,
    config: SessionConfig,
}

impl Builder {
    pub fn new(
        identity: Arc<dyn IdentityProvider + Send + Sync>,
        profiles: Arc<dyn ProfileStore + Send + Sync>,
    ) -> Self {
        Self {
            identity,
            profiles,
            config: SessionConfig::default(),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> (SessionStore, SessionHandle) {
        let (command_send, command_recv) = mpsc::channel(self.config.command_buffer);
        let (state_send, state_recv) = watch::channel(SessionState::initial());

        let store = SessionStore {
            identity: self.identity,
            profiles: self.profiles,
            config: self.config,
            command_send: command_send.downgrade(),
            command_recv,
            state_send,
            state: SessionState::initial(),
            epoch: 0,
            suppress_signed_in: None,
        };

        (store, SessionHandle::new(command_send, state_recv))
    }
}

/// Single authoritative owner of [`SessionState`].
///
/// Runs as a task, applying sign in/up/out commands and identity provider
/// events strictly in arrival order, and publishing every state change
/// through a watch channel.
pub struct SessionStore {
    identity: Arc<dyn IdentityProvider + Send + Sync>,
    profiles: Arc<dyn ProfileStore + Send + Sync>,
    config: SessionConfig,
    // Weak so the loop ends once every handle is gone; fetch and deadline
    // tasks upgrade it when posting their completion back.
    command_send: mpsc::WeakSender<Command>,
    command_recv: mpsc::Receiver<Command>,
    state_send: watch::Sender<SessionState>,
    state: SessionState,
    // Incremented on every principal transition; profile fetches carry the
    // epoch they were issued for so stale completions can be discarded.
    epoch: u64,
    // Identifier whose next echoed SignedIn is dropped: sign up discards
    // its upstream session immediately, the echo must not resurface it.
    suppress_signed_in: Option<String>,
}

impl SessionStore {
    pub async fn run(mut self) {
        info!("Session store running");

        let mut events = self.identity.subscribe();

        self.restore_session().await;

        let mut events_open = true;
        loop {
            tokio::select! {
                command = self.command_recv.recv() => {
                    match command {
                        Some(command) => {
                            if let Err(err) = self.handle_command(command).await {
                                error!("Handle command {}", err);
                            }
                        }
                        None => break,
                    }
                }
                event = events.recv(), if events_open => {
                    match event {
                        Ok(event) => self.apply_event(event),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Session events lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => events_open = false,
                    }
                }
            }
        }

        info!("Session store stopped");
    }

    /// One shot session restoration at startup. `auth_loading` settles to
    /// false here exactly once, whatever the provider answered.
    async fn restore_session(&mut self) {
        match self.identity.current_session().await {
            Ok(session) => self.transition(session),
            Err(err) => warn!("Restore session: {}", err),
        }
        self.state.auth_loading = false;
        self.publish();
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        debug!(?command, "Handle command");

        match command {
            Command::SignIn(work) => self.sign_in(work).await,
            Command::SignUp(work) => self.sign_up(work).await,
            Command::SignOut(work) => self.sign_out(work).await,
            Command::ProfileFetched {
                epoch,
                principal_id,
                result,
            } => self.commit_profile(epoch, principal_id, result),
            Command::ProfileDeadline { epoch } => {
                self.profile_deadline(epoch);
                Ok(())
            }
        }
    }

    async fn sign_in(&mut self, mut work: Work<SignIn, Principal>) -> Result<()> {
        let SignIn { email, password } = &work.request;

        // The command resolves once credentials are confirmed; the profile
        // fetch proceeds independently of the returned result.
        match self.identity.sign_in_with_password(email, password).await {
            Ok(session) => {
                let principal = Principal::User(session.user.clone());
                self.establish(session);
                self.state.auth_loading = false;
                self.publish();
                work.send_response(Ok(principal))
            }
            // State stays untouched on failure.
            Err(err) => work.send_response(Err(err)),
        }
    }

    async fn sign_up(&mut self, mut work: Work<SignUp, Principal>) -> Result<()> {
        let SignUp {
            email,
            password,
            display_name,
            requested_role,
        } = &work.request;

        let session = match self.identity.sign_up(email, password, display_name).await {
            Ok(session) => session,
            Err(err) => return work.send_response(Err(err)),
        };

        // Identity creation alone decides the outcome; the role assignment is
        // best effort.
        if let Err(err) = self
            .profiles
            .update_profile_role(&session.user.id, *requested_role)
            .await
        {
            warn!(id = %session.user.id, role = %requested_role, "Assign requested role: {}", err);
        }

        // Force an explicit authentication afterwards.
        if let Err(err) = self.identity.sign_out().await {
            warn!("Sign out after sign up: {}", err);
        }
        self.suppress_signed_in = Some(session.user.id.clone());
        self.transition(None);
        self.state.auth_loading = false;
        self.publish();

        work.send_response(Ok(Principal::User(session.user)))
    }

    async fn sign_out(&mut self, mut work: Work<(), ()>) -> Result<()> {
        // Local state is logged out immediately; the upstream outcome is
        // still reported to the caller.
        self.transition(None);
        self.state.auth_loading = false;
        self.publish();

        work.send_response(self.identity.sign_out().await)
    }

    fn apply_event(&mut self, event: SessionEvent) {
        debug!(?event, "Session event");

        match event {
            SessionEvent::SignedIn(session) => {
                if self.suppress_signed_in.as_deref() == Some(session.user.id.as_str()) {
                    self.suppress_signed_in = None;
                    trace!(id = %session.user.id, "Drop echoed sign up session");
                    return;
                }
                self.transition(Some(session));
            }
            SessionEvent::TokenRefreshed(session) => self.transition(Some(session)),
            SessionEvent::SignedOut => self.transition(None),
        }
        self.publish();
    }

    /// Move to the given principal on a provider event. A transition to the
    /// principal already held is a no-op that keeps the committed profile
    /// (token refresh, or the provider echoing a sign in the store performed
    /// itself).
    fn transition(&mut self, session: Option<Session>) {
        match session {
            Some(session) => {
                if self.state.principal.id() == Some(session.user.id.as_str()) {
                    return;
                }
                self.establish(session);
            }
            None => {
                self.state.principal = Principal::Anonymous;
                self.state.profile = None;
                self.state.profile_loading = false;
                self.state.profile_unavailable = false;
                // Invalidate any in flight fetch.
                self.epoch += 1;
            }
        }
    }

    /// Commit an explicitly confirmed session. Unlike [`transition`], a
    /// repeated sign in for the principal already held re-issues the profile
    /// fetch when no profile is committed, so an expired deadline or a
    /// failed fetch is recoverable without signing out first.
    ///
    /// [`transition`]: SessionStore::transition
    fn establish(&mut self, session: Session) {
        if self.state.principal.id() == Some(session.user.id.as_str())
            && self.state.profile.is_some()
        {
            return;
        }
        let principal_id = session.user.id.clone();
        self.state.principal = Principal::User(session.user);
        self.state.profile = None;
        self.state.profile_loading = true;
        self.state.profile_unavailable = false;
        self.spawn_profile_fetch(principal_id);
    }

    fn spawn_profile_fetch(&mut self, principal_id: String) {
        self.epoch += 1;
        let epoch = self.epoch;

        debug!(id = %principal_id, epoch, "Fetch profile");

        let profiles = Arc::clone(&self.profiles);
        let sender = self.command_send.clone();
        let id = principal_id.clone();
        tokio::spawn(async move {
            let result = profiles.fetch_profile_by_id(&id).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender
                    .send(Command::ProfileFetched {
                        epoch,
                        principal_id: id,
                        result,
                    })
                    .await;
            }
        });

        let deadline = self.config.profile_fetch_timeout();
        let sender = self.command_send.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(Command::ProfileDeadline { epoch }).await;
            }
        });
    }

    fn commit_profile(
        &mut self,
        epoch: u64,
        principal_id: String,
        result: Result<Profile, ProfileError>,
    ) -> Result<()> {
        // Supersession rule: a fetch issued for an earlier epoch, or for a
        // principal no longer held, must not overwrite newer state. Expected
        // race outcome, not a failure.
        if epoch != self.epoch || self.state.principal.id() != Some(principal_id.as_str()) {
            trace!(epoch, id = %principal_id, "Discard stale profile fetch");
            return Ok(());
        }

        match result {
            Ok(profile) => {
                self.state.profile = Some(profile);
                self.state.profile_loading = false;
                self.state.profile_unavailable = false;
                self.publish();
                Ok(())
            }
            // Fail closed: the profile stays absent and loading until the
            // deadline; the command loop logs the error.
            Err(err) => Err(ErrorKind::ProfileFetch(err).into()),
        }
    }

    fn profile_deadline(&mut self, epoch: u64) {
        if epoch != self.epoch || self.state.profile.is_some() {
            return;
        }
        if !self.state.profile_loading {
            return;
        }

        warn!(epoch, "Profile fetch deadline expired");
        self.state.profile_loading = false;
        self.state.profile_unavailable = true;
        self.publish();
    }

    fn publish(&self) {
        self.state_send.send_replace(self.state.clone());
    }
}
