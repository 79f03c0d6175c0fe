use std::fmt;

use tokio::sync::oneshot;

use crate::common::{ErrorKind, Result};
use crate::error::{AuthError, ProfileError};
use crate::session::{Principal, Profile, Role};

/// Request paired with the channel its response is sent through.
pub(crate) struct Work<Req, Res> {
    pub(crate) request: Req,
    // Wrap with option so that response can be sent via mut reference.
    pub(crate) response_sender: Option<oneshot::Sender<Result<Res, AuthError>>>,
}

impl<Req, Res> Work<Req, Res> {
    pub(crate) fn send_response(&mut self, response: Result<Res, AuthError>) -> Result<()> {
        self.response_sender
            .take()
            .expect("response already sent")
            .send(response)
            .map_err(|_| ErrorKind::Internal("send response".to_owned()).into())
    }
}

pub(crate) struct SignIn {
    pub(crate) email: String,
    pub(crate) password: String,
}

pub(crate) struct SignUp {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) display_name: String,
    pub(crate) requested_role: Role,
}

pub(crate) enum Command {
    SignIn(Work<SignIn, Principal>),
    SignUp(Work<SignUp, Principal>),
    SignOut(Work<(), ()>),
    /// Completion of a profile fetch issued for the tagged epoch.
    ProfileFetched {
        epoch: u64,
        principal_id: String,
        result: Result<Profile, ProfileError>,
    },
    /// The fetch deadline for the tagged epoch expired.
    ProfileDeadline { epoch: u64 },
}

impl Command {
    pub(crate) fn new_sign_in(
        email: String,
        password: String,
    ) -> (Command, oneshot::Receiver<Result<Principal, AuthError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Command::SignIn(Work {
                request: SignIn { email, password },
                response_sender: Some(tx),
            }),
            rx,
        )
    }

    pub(crate) fn new_sign_up(
        email: String,
        password: String,
        display_name: String,
        requested_role: Role,
    ) -> (Command, oneshot::Receiver<Result<Principal, AuthError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Command::SignUp(Work {
                request: SignUp {
                    email,
                    password,
                    display_name,
                    requested_role,
                },
                response_sender: Some(tx),
            }),
            rx,
        )
    }

    pub(crate) fn new_sign_out() -> (Command, oneshot::Receiver<Result<(), AuthError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Command::SignOut(Work {
                request: (),
                response_sender: Some(tx),
            }),
            rx,
        )
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::SignIn(work) => write!(f, "SignIn({})", work.request.email),
            Command::SignUp(work) => write!(f, "SignUp({})", work.request.email),
            Command::SignOut(_) => write!(f, "SignOut"),
            Command::ProfileFetched {
                epoch,
                principal_id,
                ..
            } => write!(f, "ProfileFetched(epoch={}, id={})", epoch, principal_id),
            Command::ProfileDeadline { epoch } => write!(f, "ProfileDeadline(epoch={})", epoch),
        }
    }
}
