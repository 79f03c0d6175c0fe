#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod gate;
pub mod provider;
pub mod session;

pub use crate::error::AuthError;
pub type Result<T, E = crate::error::AuthError> = std::result::Result<T, E>;

pub use gate::{decide, Decision, Requirement};
pub use session::{Principal, Profile, Role, SessionState};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub(crate) type Time = chrono::DateTime<chrono::Utc>;

    #[allow(unused_imports)]
    pub(crate) use tracing::{debug, error, info, trace, warn};
}
