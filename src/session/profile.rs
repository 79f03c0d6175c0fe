use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Applicant,
    Reviewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Applicant => write!(f, "applicant"),
            Role::Reviewer => write!(f, "reviewer"),
        }
    }
}

/// Application level identity record associated with a principal.
///
/// Fetched asynchronously after the principal is established, so a state
/// snapshot can hold a principal without its profile for a while.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Equal to the principal identifier it belongs to.
    pub id: String,
    pub display_name: String,
    pub role: Role,
}
