use serde::{Deserialize, Serialize};

/// Identity confirmed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    User(User),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    pub(crate) fn id(&self) -> Option<&str> {
        match self {
            Principal::User(user) => Some(user.id.as_str()),
            Principal::Anonymous => None,
        }
    }
}
