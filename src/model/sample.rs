//! The demo data set: four users (one banned, one admin), three subjects,
//! a poll in each lifecycle state plus one with duplicate subjects, and a
//! few votes.
//!
//! Identifiers are fixed so tests and manual API calls can refer to them.

use chrono::{DateTime, Duration, Utc};

use crate::model::{
    id::{Id, NewsId, NominationId, PollId, PollSubjectId, UserId},
    news::News,
    nomination::{Nomination, Vote},
    poll::{Poll, PollState, PollSubject},
    tables::Tables,
    user::{Administrator, User},
};

pub const LALI: UserId = Id::from_u128(1);
pub const AGI: UserId = Id::from_u128(2);
pub const NOEMI: UserId = Id::from_u128(3);
pub const ADMIN: UserId = Id::from_u128(4);

pub const NEWS_FIRST: NewsId = Id::from_u128(101);
pub const NEWS_SECOND: NewsId = Id::from_u128(102);

pub const EHEZOK_VIADALA: PollSubjectId = 1;
pub const VALAMI_AMERIKA: PollSubjectId = 2;
pub const VALAMI_AMERIKA_2: PollSubjectId = 3;

/// Nomination state, one nomination.
pub const POLL_NOMINATION: PollId = Id::from_u128(201);
/// Voting state, two nominations and one vote.
pub const POLL_VOTING: PollId = Id::from_u128(202);
/// Closed, two nominations with a vote each.
pub const POLL_CLOSED: PollId = Id::from_u128(203);
/// Nomination state, two nominations on the same subject.
pub const POLL_DUPLICATES: PollId = Id::from_u128(204);

pub const NOMINATION_1: NominationId = Id::from_u128(301);
pub const VOTING_NOMINATION_1: NominationId = Id::from_u128(302);
pub const VOTING_NOMINATION_2: NominationId = Id::from_u128(303);
pub const CLOSED_NOMINATION_1: NominationId = Id::from_u128(304);
pub const CLOSED_NOMINATION_2: NominationId = Id::from_u128(305);
pub const DUPLICATE_NOMINATION_1: NominationId = Id::from_u128(306);
pub const DUPLICATE_NOMINATION_2: NominationId = Id::from_u128(307);

/// Build the sample data set with dates relative to `now`.
pub fn sample_tables(now: DateTime<Utc>) -> Tables {
    let day = |offset: i64| now + Duration::days(offset);
    let mut tables = Tables::new();

    tables.users.extend([
        user(LALI, "Lali", false),
        user(AGI, "Agi", false),
        user(NOEMI, "Noemi", true),
        user(ADMIN, "Admin", false),
    ]);
    tables.administrators.upsert(Administrator { user_id: ADMIN });

    tables.news.extend([
        News {
            id: NEWS_FIRST,
            title: "First".to_string(),
            text: "Blah blah".to_string(),
            publication_date: day(-2),
        },
        News {
            id: NEWS_SECOND,
            title: "Second".to_string(),
            text: "Blah blah blah".to_string(),
            publication_date: day(-1),
        },
    ]);

    tables.poll_subjects.extend([
        subject(EHEZOK_VIADALA, "Ehezok viadala", 2013),
        subject(VALAMI_AMERIKA, "Valami Amerika", 2005),
        subject(VALAMI_AMERIKA_2, "Valami Amerika 2", 2007),
    ]);

    let poll = |id, title: &str, state, offsets: [i64; 5]| Poll {
        id,
        title: title.to_string(),
        text: title.to_string(),
        state,
        publication_date: day(offsets[0]),
        nomination_deadline: day(offsets[1]),
        voting_start_date: day(offsets[2]),
        voting_deadline: day(offsets[3]),
        announcement_date: day(offsets[4]),
    };
    tables.polls.extend([
        poll(
            POLL_NOMINATION,
            "Ki a legjobb?",
            PollState::Nomination,
            [-2, 2, 4, 8, 14],
        ),
        poll(
            POLL_VOTING,
            "Melyik a legjobb magyar film?",
            PollState::Voting,
            [-10, -2, -1, 8, 12],
        ),
        poll(
            POLL_CLOSED,
            "Melyik volt a legjobb magyar film?",
            PollState::Closed,
            [-10, -8, -6, -4, -1],
        ),
        poll(
            POLL_DUPLICATES,
            "Melyik a legjobb film?",
            PollState::Nomination,
            [-10, -8, 2, 7, 10],
        ),
    ]);

    tables.nominations.extend([
        nomination(NOMINATION_1, POLL_NOMINATION, EHEZOK_VIADALA, LALI, "Mert en azt mondtam"),
        nomination(VOTING_NOMINATION_1, POLL_VOTING, VALAMI_AMERIKA, LALI, "A kedvencem"),
        nomination(VOTING_NOMINATION_2, POLL_VOTING, VALAMI_AMERIKA_2, AGI, "Vicces"),
        nomination(CLOSED_NOMINATION_1, POLL_CLOSED, VALAMI_AMERIKA, LALI, "Jok a szineszek"),
        nomination(CLOSED_NOMINATION_2, POLL_CLOSED, VALAMI_AMERIKA_2, AGI, "Jo a tortenet"),
        nomination(DUPLICATE_NOMINATION_1, POLL_DUPLICATES, VALAMI_AMERIKA, LALI, "Valami"),
        nomination(DUPLICATE_NOMINATION_2, POLL_DUPLICATES, VALAMI_AMERIKA, AGI, "Csak"),
    ]);

    tables.votes.extend([
        Vote {
            nomination: VOTING_NOMINATION_2,
            user: AGI,
            date: day(-1),
        },
        Vote {
            nomination: CLOSED_NOMINATION_1,
            user: AGI,
            date: day(-2),
        },
        Vote {
            nomination: CLOSED_NOMINATION_2,
            user: LALI,
            date: day(-3),
        },
    ]);

    tables.refresh_relational_lists();
    tables
}

fn user(id: UserId, name: &str, is_banned: bool) -> User {
    User {
        id,
        name: name.to_string(),
        is_banned,
    }
}

fn subject(id: PollSubjectId, title: &str, year: i32) -> PollSubject {
    PollSubject {
        id,
        title: title.to_string(),
        year,
    }
}

fn nomination(
    id: NominationId,
    poll: PollId,
    subject: PollSubjectId,
    user: UserId,
    text: &str,
) -> Nomination {
    Nomination {
        id,
        poll,
        subject,
        user: Some(user),
        text: text.to_string(),
        vote_count: 0,
    }
}
