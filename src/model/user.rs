use serde::{Deserialize, Serialize};

use crate::model::{id::UserId, table::Record};

/// Someone who can nominate and vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub is_banned: bool,
}

impl Record for User {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }
}

/// Marks a user as an administrator. Holds only a weak reference to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
    pub user_id: UserId,
}

impl Record for Administrator {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.user_id
    }
}
