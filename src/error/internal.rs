use std::error;
use std::fmt;

use backtrace::Backtrace;

use crate::error::ProfileError;

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    #[allow(dead_code)]
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    ProfileFetch(ProfileError),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::ProfileFetch(err) => err.fmt(f),
            ErrorKind::Internal(description) => write!(f, "internal error. {}", description),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl error::Error for Error {}
