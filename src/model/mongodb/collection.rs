use std::ops::Deref;

use mongodb::{bson::Document, Collection, Database};

use crate::model::{
    news::News,
    nomination::{Nomination, Vote},
    poll::{Poll, PollSubject},
    tables::Kind,
    user::{Administrator, User},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;

    /// Fields derived from other collections; never written.
    const DERIVED_FIELDS: &'static [&'static str] = &[];
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }

    /// The same collection, read and written as raw documents.
    pub fn documents(&self) -> Collection<Document> {
        self.0.clone_with_type()
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

const USERS: &str = "users";
impl MongoCollection for User {
    const NAME: &'static str = USERS;
}

const ADMINISTRATORS: &str = "administrators";
impl MongoCollection for Administrator {
    const NAME: &'static str = ADMINISTRATORS;
}

const POLL_SUBJECTS: &str = "poll_subjects";
impl MongoCollection for PollSubject {
    const NAME: &'static str = POLL_SUBJECTS;
}

const POLLS: &str = "polls";
impl MongoCollection for Poll {
    const NAME: &'static str = POLLS;
}

const NOMINATIONS: &str = "nominations";
impl MongoCollection for Nomination {
    const NAME: &'static str = NOMINATIONS;
    const DERIVED_FIELDS: &'static [&'static str] = &["vote_count"];
}

const VOTES: &str = "votes";
impl MongoCollection for Vote {
    const NAME: &'static str = VOTES;
}

const NEWS: &str = "news";
impl MongoCollection for News {
    const NAME: &'static str = NEWS;
}

/// Every collection the backend owns.
pub const ALL_COLLECTIONS: [&str; 7] = [
    USERS,
    ADMINISTRATORS,
    POLL_SUBJECTS,
    POLLS,
    NOMINATIONS,
    VOTES,
    NEWS,
];

/// The collection rows of the given kind are stored in.
pub fn collection_name(kind: Kind) -> &'static str {
    match kind {
        Kind::User => USERS,
        Kind::Administrator => ADMINISTRATORS,
        Kind::PollSubject => POLL_SUBJECTS,
        Kind::Poll => POLLS,
        Kind::Nomination => NOMINATIONS,
        Kind::Vote => VOTES,
        Kind::News => NEWS,
    }
}
