pub(crate) mod internal;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // The identity provider rejected the given credentials.
    InvalidCredentials,
    // The input was rejected before reaching the identity provider.
    MalformedInput { description: String },
    // The identity provider could not be reached.
    Network { description: String },
    // The identity provider (or the session store itself) failed.
    Provider { description: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
            AuthError::MalformedInput { description } => {
                write!(f, "malformed input. {}", description)
            }
            AuthError::Network { description } => write!(f, "network error. {}", description),
            AuthError::Provider { description } => write!(f, "provider error. {}", description),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    // No profile row exists for the given identifier.
    NotFound { id: String },
    Store { description: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProfileError::NotFound { id } => write!(f, "profile not found. id: {}", id),
            ProfileError::Store { description } => {
                write!(f, "profile store error. {}", description)
            }
        }
    }
}

impl std::error::Error for ProfileError {}
