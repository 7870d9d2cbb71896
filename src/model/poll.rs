use chrono::{DateTime, Utc};
use rocket::FromFormField;
use serde::{Deserialize, Serialize};

use crate::model::{
    id::{PollId, PollSubjectId},
    table::Record,
};

/// States in the poll lifecycle. Transitions are driven by callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromFormField)]
pub enum PollState {
    /// Users may nominate subjects.
    Nomination,
    /// Users may vote on the nominations.
    Voting,
    /// Finished; results are announced.
    Closed,
}

/// A voting round. Its nominations are stored separately and linked by
/// [`Nomination::poll`](crate::model::nomination::Nomination::poll).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    #[serde(default)]
    pub id: PollId,
    pub title: String,
    pub text: String,
    pub state: PollState,
    pub publication_date: DateTime<Utc>,
    pub nomination_deadline: DateTime<Utc>,
    pub voting_start_date: DateTime<Utc>,
    pub voting_deadline: DateTime<Utc>,
    pub announcement_date: DateTime<Utc>,
}

impl Record for Poll {
    type Key = PollId;

    fn key(&self) -> PollId {
        self.id
    }
}

/// Something that can be nominated, e.g. a film and the year it came out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSubject {
    pub id: PollSubjectId,
    pub title: String,
    pub year: i32,
}

impl Record for PollSubject {
    type Key = PollSubjectId;

    fn key(&self) -> PollSubjectId {
        self.id
    }
}
