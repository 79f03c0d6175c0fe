use tokio::sync::{mpsc, watch};

use crate::error::AuthError;
use crate::session::command::Command;
use crate::session::{Principal, Role, SessionState};
use crate::Result;

/// Cheap cloneable handle to the session store task.
///
/// The synchronous readers (`state`, `is_authenticated`, `is_admin`,
/// `is_ready`) work on the latest published snapshot and never suspend.
#[derive(Clone)]
pub struct SessionHandle {
    command_send: mpsc::Sender<Command>,
    state_recv: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub(crate) fn new(
        command_send: mpsc::Sender<Command>,
        state_recv: watch::Receiver<SessionState>,
    ) -> Self {
        Self {
            command_send,
            state_recv,
        }
    }

    /// Resolves as soon as the identity provider confirms the credentials.
    /// The profile fetch continues in the background.
    pub async fn sign_in(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Principal> {
        let (command, rx) = Command::new_sign_in(email.into(), password.into());
        self.dispatch(command, rx).await
    }

    /// Creates the identity, assigns the requested role best effort, then
    /// signs the fresh session back out. A following [`sign_in`] is required
    /// to authenticate.
    ///
    /// [`sign_in`]: SessionHandle::sign_in
    pub async fn sign_up(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
        requested_role: Role,
    ) -> Result<Principal> {
        let (command, rx) = Command::new_sign_up(
            email.into(),
            password.into(),
            display_name.into(),
            requested_role,
        );
        self.dispatch(command, rx).await
    }

    pub async fn sign_out(&self) -> Result<()> {
        let (command, rx) = Command::new_sign_out();
        self.dispatch(command, rx).await
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_recv.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state_recv.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state_recv.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state_recv.borrow().is_admin()
    }

    pub fn is_ready(&self) -> bool {
        self.state_recv.borrow().is_ready()
    }

    async fn dispatch<Res>(
        &self,
        command: Command,
        rx: tokio::sync::oneshot::Receiver<Result<Res>>,
    ) -> Result<Res> {
        self.command_send
            .send(command)
            .await
            .map_err(|_| SessionHandle::unavailable())?;
        rx.await.map_err(|_| SessionHandle::unavailable())?
    }

    fn unavailable() -> AuthError {
        AuthError::Provider {
            description: "session store unavailable".to_owned(),
        }
    }
}
