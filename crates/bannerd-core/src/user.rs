use serde::{Deserialize, Serialize};

use crate::banner::TagId;

/// A user as held by the primary store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub is_admin: bool,
    #[serde(default)]
    pub tags: Vec<TagId>,
}

/// The authenticated identity behind a request, rebuilt from token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub name: String,
    pub is_admin: bool,
    #[serde(default)]
    pub tags: Vec<TagId>,
}

impl From<User> for Caller {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            is_admin: user.is_admin,
            tags: user.tags,
        }
    }
}
