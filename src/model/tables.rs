use std::collections::HashMap;

use crate::model::{
    id::{NewsId, NominationId, PollId, PollSubjectId, UserId},
    news::News,
    nomination::{Nomination, Vote, VoteKey},
    poll::{Poll, PollSubject},
    table::{Record, Table},
    user::{Administrator, User},
};

/// The entity kinds held by [`Tables`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    User,
    Administrator,
    PollSubject,
    Poll,
    Nomination,
    Vote,
    News,
}

/// A row of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    User(User),
    Administrator(Administrator),
    PollSubject(PollSubject),
    Poll(Poll),
    Nomination(Nomination),
    Vote(Vote),
    News(News),
}

/// The key of a row of any kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    User(UserId),
    Administrator(UserId),
    PollSubject(PollSubjectId),
    Poll(PollId),
    Nomination(NominationId),
    Vote(VoteKey),
    News(NewsId),
}

/// A single write against [`Tables`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Insert the row, replacing any row with the same key.
    Upsert(Row),
    /// Remove the row with this key if present.
    Delete(Key),
}

macro_rules! row_kinds {
    ($($kind:ident),*) => {
        impl Row {
            pub fn kind(&self) -> Kind {
                match self {
                    $(Self::$kind(_) => Kind::$kind,)*
                }
            }

            pub fn key(&self) -> Key {
                match self {
                    $(Self::$kind(row) => Key::$kind(row.key()),)*
                }
            }
        }

        impl Key {
            pub fn kind(&self) -> Kind {
                match self {
                    $(Self::$kind(_) => Kind::$kind,)*
                }
            }
        }

        $(
            impl From<$kind> for Row {
                fn from(row: $kind) -> Self {
                    Self::$kind(row)
                }
            }
        )*
    };
}

row_kinds!(User, Administrator, PollSubject, Poll, Nomination, Vote, News);

impl Change {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Upsert(row) => row.kind(),
            Self::Delete(key) => key.kind(),
        }
    }

    pub fn upsert(row: impl Into<Row>) -> Self {
        Self::Upsert(row.into())
    }
}

/// One flat collection per entity kind, plus the relationships derived from
/// them.
///
/// The flat collections are the source of truth. The nominations of each
/// poll and the vote count of each nomination are a view over them, kept
/// current by [`Tables::apply`] and rebuilt wholesale by
/// [`Tables::refresh_relational_lists`]. Code that writes the collections
/// directly must call the latter afterwards.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Table<User>,
    pub administrators: Table<Administrator>,
    pub poll_subjects: Table<PollSubject>,
    pub polls: Table<Poll>,
    pub nominations: Table<Nomination>,
    pub votes: Table<Vote>,
    pub news: Table<News>,
    poll_nominations: HashMap<PollId, Vec<NominationId>>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Rebuild every poll's nomination list and every nomination's vote
    /// count from the flat collections.
    pub fn refresh_relational_lists(&mut self) {
        let mut counts: HashMap<NominationId, u32> = HashMap::new();
        for vote in &self.votes {
            *counts.entry(vote.nomination).or_default() += 1;
        }

        self.poll_nominations.clear();
        for nomination in self.nominations.values_mut() {
            nomination.vote_count = counts.get(&nomination.id).copied().unwrap_or(0);
            self.poll_nominations
                .entry(nomination.poll)
                .or_default()
                .push(nomination.id);
        }
    }

    pub fn contains(&self, key: &Key) -> bool {
        match key {
            Key::User(id) => self.users.contains_key(id),
            Key::Administrator(id) => self.administrators.contains_key(id),
            Key::PollSubject(id) => self.poll_subjects.contains_key(id),
            Key::Poll(id) => self.polls.contains_key(id),
            Key::Nomination(id) => self.nominations.contains_key(id),
            Key::Vote(key) => self.votes.contains_key(key),
            Key::News(id) => self.news.contains_key(id),
        }
    }

    /// The nominations belonging to a poll, in collection order.
    pub fn nominations_of(&self, poll: PollId) -> impl Iterator<Item = &Nomination> + '_ {
        self.poll_nominations
            .get(&poll)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nominations.get(id))
    }

    /// The poll a nomination belongs to, if it is stored.
    pub fn poll_of(&self, nomination: &Nomination) -> Option<&Poll> {
        self.polls.get(&nomination.poll)
    }

    /// The poll a vote was cast in, if both its nomination and poll are stored.
    pub fn poll_of_vote(&self, vote: &Vote) -> Option<&Poll> {
        self.nominations
            .get(&vote.nomination)
            .and_then(|nomination| self.poll_of(nomination))
    }

    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Upsert(row) => self.upsert(row),
            Change::Delete(key) => self.delete(key),
        }
    }

    fn upsert(&mut self, row: Row) {
        match row {
            Row::User(user) => {
                self.users.upsert(user);
            }
            Row::Administrator(admin) => {
                self.administrators.upsert(admin);
            }
            Row::PollSubject(subject) => {
                self.poll_subjects.upsert(subject);
            }
            Row::Poll(poll) => {
                self.polls.upsert(poll);
            }
            Row::Nomination(mut nomination) => {
                let (id, poll) = (nomination.id, nomination.poll);
                nomination.vote_count = self.count_votes(id);
                if let Some(old) = self.nominations.upsert(nomination) {
                    if old.poll != poll {
                        self.unlink(old.poll, id);
                    }
                }
                self.link(poll, id);
            }
            Row::Vote(vote) => {
                let nomination = vote.nomination;
                self.votes.upsert(vote);
                self.recount(nomination);
            }
            Row::News(news) => {
                self.news.upsert(news);
            }
        }
    }

    fn delete(&mut self, key: Key) {
        match key {
            Key::User(id) => {
                self.users.remove(&id);
            }
            Key::Administrator(id) => {
                self.administrators.remove(&id);
            }
            Key::PollSubject(id) => {
                self.poll_subjects.remove(&id);
            }
            Key::Poll(id) => {
                // Nominations are left in place, orphaned.
                self.polls.remove(&id);
            }
            Key::Nomination(id) => {
                if let Some(old) = self.nominations.remove(&id) {
                    self.unlink(old.poll, id);
                }
            }
            Key::Vote(key) => {
                if self.votes.remove(&key).is_some() {
                    self.recount(key.nomination);
                }
            }
            Key::News(id) => {
                self.news.remove(&id);
            }
        }
    }

    fn count_votes(&self, nomination: NominationId) -> u32 {
        let count = self
            .votes
            .iter()
            .filter(|vote| vote.nomination == nomination)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn recount(&mut self, nomination: NominationId) {
        let count = self.count_votes(nomination);
        if let Some(nomination) = self.nominations.get_mut(&nomination) {
            nomination.vote_count = count;
        }
    }

    fn link(&mut self, poll: PollId, nomination: NominationId) {
        let list = self.poll_nominations.entry(poll).or_default();
        if !list.contains(&nomination) {
            list.push(nomination);
        }
    }

    fn unlink(&mut self, poll: PollId, nomination: NominationId) {
        if let Some(list) = self.poll_nominations.get_mut(&poll) {
            list.retain(|id| *id != nomination);
        }
    }
}
