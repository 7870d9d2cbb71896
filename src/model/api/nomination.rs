use serde::{Deserialize, Serialize};

use crate::model::{
    id::{NominationId, PollId},
    nomination::Nomination,
    poll::PollSubject,
    tables::Tables,
    user::User,
};

/// A nomination together with the rows it refers to, as clients display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationDescription {
    pub id: NominationId,
    pub poll: PollId,
    /// Title of the owning poll; absent once the poll is deleted.
    pub poll_title: Option<String>,
    /// Absent once the subject is deleted.
    pub subject: Option<PollSubject>,
    /// The proposing user; absent for anonymous or deleted users.
    pub user: Option<User>,
    pub text: String,
    pub vote_count: u32,
}

impl NominationDescription {
    /// Resolve the references of `nomination` against `tables`.
    pub fn new(nomination: &Nomination, tables: &Tables) -> Self {
        Self {
            id: nomination.id,
            poll: nomination.poll,
            poll_title: tables.poll_of(nomination).map(|poll| poll.title.clone()),
            subject: tables.poll_subjects.get(&nomination.subject).cloned(),
            user: nomination
                .user
                .and_then(|user| tables.users.get(&user))
                .cloned(),
            text: nomination.text.clone(),
            vote_count: nomination.vote_count,
        }
    }
}
