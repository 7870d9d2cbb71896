use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    id::{NominationId, PollId, PollSubjectId, UserId},
    table::Record,
};

/// A candidate entry within a poll: a subject, and the user who proposed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    #[serde(default)]
    pub id: NominationId,
    /// The owning poll.
    pub poll: PollId,
    pub subject: PollSubjectId,
    #[serde(default)]
    pub user: Option<UserId>,
    pub text: String,
    /// Number of votes on this nomination. Derived from the vote table and
    /// kept up to date by [`Tables`](crate::model::Tables); any value supplied
    /// by a caller is overwritten on save.
    #[serde(default)]
    pub vote_count: u32,
}

impl Record for Nomination {
    type Key = NominationId;

    fn key(&self) -> NominationId {
        self.id
    }
}

/// Votes are identified by who voted for what.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteKey {
    pub nomination: NominationId,
    pub user: UserId,
}

/// A user's choice of nomination within a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub nomination: NominationId,
    pub user: UserId,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
}

impl Record for Vote {
    type Key = VoteKey;

    fn key(&self) -> VoteKey {
        VoteKey {
            nomination: self.nomination,
            user: self.user,
        }
    }
}
