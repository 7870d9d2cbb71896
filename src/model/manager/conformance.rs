//! Behaviour every backend must show, written once and run against each.
//!
//! Every test receives a [`DataManager`] holding the sample data set.

use chrono::{Duration, Utc};

use super::DataManager;
use crate::error::Error;
use crate::model::{
    id::{Id, NominationId},
    news::News,
    nomination::{Nomination, Vote},
    poll::{Poll, PollState, PollSubject},
    sample::*,
    user::User,
};

/// Invoke `$runner!` with the name of every conformance test.
macro_rules! conformance_suite {
    ($runner:ident) => {
        $runner!(
            is_admin,
            grant_and_revoke_admin,
            query_news,
            save_news,
            delete_news,
            query_nominations,
            nominations_are_ordered_by_subject,
            query_nominations_by_user,
            query_nominations_by_poll_and_user,
            save_nomination,
            delete_nomination,
            query_polls,
            query_polls_by_state,
            save_poll,
            delete_poll_keeps_nominations,
            search_poll_subjects,
            save_poll_subject,
            save_poll_subjects_batch,
            delete_poll_subject,
            query_banned_users,
            search_users,
            save_and_delete_user,
            query_vote,
            query_vote_reports_duplicates,
            save_vote_replaces_vote_in_same_poll,
            save_vote_requires_nomination_and_poll,
            delete_vote,
        );
    };
}

pub(crate) use conformance_suite;

fn user(manager: &DataManager, id: Id) -> User {
    manager.query_user(id).unwrap().clone()
}

fn poll(manager: &DataManager, id: Id) -> Poll {
    manager.query_poll(id).unwrap().clone()
}

fn ids(nominations: Vec<&Nomination>) -> Vec<NominationId> {
    nominations.into_iter().map(|n| n.id).collect()
}

fn vote_count(manager: &DataManager, id: NominationId) -> u32 {
    manager.query_nomination(id).unwrap().vote_count
}

pub async fn is_admin(manager: DataManager) {
    let admin = user(&manager, ADMIN);
    let lali = user(&manager, LALI);
    assert!(manager.is_admin(Some(&admin)).unwrap());
    assert!(!manager.is_admin(Some(&lali)).unwrap());
    assert!(!manager.is_admin(Some(&User::example("Nobody"))).unwrap());
    assert!(matches!(
        manager.is_admin(None),
        Err(Error::InvalidArgument(_))
    ));
}

pub async fn grant_and_revoke_admin(mut manager: DataManager) {
    let lali = user(&manager, LALI);

    manager.grant_admin(LALI).await.unwrap();
    manager.grant_admin(LALI).await.unwrap();
    assert!(manager.is_admin(Some(&lali)).unwrap());
    assert_eq!(manager.query_administrators().len(), 2);

    manager.revoke_admin(LALI).await.unwrap();
    manager.revoke_admin(LALI).await.unwrap();
    assert!(!manager.is_admin(Some(&lali)).unwrap());

    assert!(matches!(
        manager.grant_admin(Id::random()).await,
        Err(Error::NotFound(_))
    ));
}

pub async fn query_news(manager: DataManager) {
    let titles: Vec<&str> = manager
        .query_news()
        .into_iter()
        .map(|n| n.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    assert_eq!(manager.query_news_by_id(NEWS_FIRST).unwrap().title, "First");
    assert!(manager.query_news_by_id(Id::random()).is_none());
}

pub async fn save_news(mut manager: DataManager) {
    let news = News::example("Breaking", Utc::now());
    let id = manager.save_news(news.clone()).await.unwrap();
    assert!(!id.is_empty());
    assert_ne!(id, NEWS_FIRST);
    assert_ne!(id, NEWS_SECOND);
    assert_eq!(manager.query_news()[0].title, "Breaking");

    // Saving under an existing id replaces the row, whatever it held.
    let mut updated = News::example("Corrected", Utc::now() - Duration::days(30));
    updated.id = id;
    assert_eq!(manager.save_news(updated.clone()).await.unwrap(), id);
    assert_eq!(manager.save_news(updated.clone()).await.unwrap(), id);
    assert_eq!(manager.query_news().len(), 3);
    assert_eq!(manager.query_news_by_id(id), Some(&updated));
    assert_eq!(manager.query_news().last().unwrap().title, "Corrected");
}

pub async fn delete_news(mut manager: DataManager) {
    manager.delete_news(NEWS_FIRST).await.unwrap();
    manager.delete_news(NEWS_FIRST).await.unwrap();
    manager.delete_news(Id::random()).await.unwrap();
    assert!(manager.query_news_by_id(NEWS_FIRST).is_none());
    assert_eq!(manager.query_news().len(), 1);
}

pub async fn query_nominations(manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    assert_eq!(
        ids(manager.query_nominations(Some(&voting)).unwrap()),
        vec![VOTING_NOMINATION_1, VOTING_NOMINATION_2]
    );

    // Same subject twice: insertion order.
    let duplicates = poll(&manager, POLL_DUPLICATES);
    assert_eq!(
        ids(manager.query_nominations(Some(&duplicates)).unwrap()),
        vec![DUPLICATE_NOMINATION_1, DUPLICATE_NOMINATION_2]
    );

    assert!(manager
        .query_nominations(Some(&Poll::example("Unsaved", 1)))
        .unwrap()
        .is_empty());
    assert!(matches!(
        manager.query_nominations(None),
        Err(Error::InvalidArgument(_))
    ));
}

pub async fn nominations_are_ordered_by_subject(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    let ehezok = manager
        .save_nomination(Nomination::example(
            POLL_VOTING,
            EHEZOK_VIADALA,
            NOEMI,
            "Izgalmas",
        ))
        .await
        .unwrap();
    let orphan = manager
        .save_nomination(Nomination::example(POLL_VOTING, 999, NOEMI, "Nincs ilyen"))
        .await
        .unwrap();

    assert_eq!(
        ids(manager.query_nominations(Some(&voting)).unwrap()),
        vec![orphan, ehezok, VOTING_NOMINATION_1, VOTING_NOMINATION_2]
    );
}

pub async fn query_nominations_by_user(manager: DataManager) {
    let lali = user(&manager, LALI);
    assert_eq!(
        ids(manager.query_nominations_by_user(Some(&lali)).unwrap()),
        vec![
            NOMINATION_1,
            VOTING_NOMINATION_1,
            CLOSED_NOMINATION_1,
            DUPLICATE_NOMINATION_1
        ]
    );

    let admin = user(&manager, ADMIN);
    assert!(matches!(
        manager.query_nominations_by_user(Some(&admin)),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        manager.query_nominations_by_user(Some(&User::example("Ghost"))),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        manager.query_nominations_by_user(None),
        Err(Error::InvalidArgument(_))
    ));
}

pub async fn query_nominations_by_poll_and_user(mut manager: DataManager) {
    let duplicates = poll(&manager, POLL_DUPLICATES);
    let agi = user(&manager, AGI);
    let noemi = user(&manager, NOEMI);

    // Rows written straight into the tables may lack a user.
    let tables = manager.data_model_mut().tables_mut();
    let mut anonymous = Nomination::example(POLL_DUPLICATES, VALAMI_AMERIKA, AGI, "Nevtelen");
    anonymous.id = Id::random();
    anonymous.user = None;
    tables.nominations.upsert(anonymous);
    tables.refresh_relational_lists();

    assert_eq!(
        ids(manager
            .query_nominations_by_poll_and_user(Some(&duplicates), Some(&agi))
            .unwrap()),
        vec![DUPLICATE_NOMINATION_2]
    );
    assert!(manager
        .query_nominations_by_poll_and_user(Some(&duplicates), Some(&noemi))
        .unwrap()
        .is_empty());
    assert!(matches!(
        manager.query_nominations_by_poll_and_user(Some(&duplicates), None),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.query_nominations_by_poll_and_user(None, Some(&agi)),
        Err(Error::InvalidArgument(_))
    ));
}

pub async fn save_nomination(mut manager: DataManager) {
    let mut anonymous = Nomination::example(POLL_NOMINATION, VALAMI_AMERIKA, AGI, "Nevtelen");
    anonymous.user = None;
    assert!(matches!(
        manager.save_nomination(anonymous).await,
        Err(Error::InvalidArgument(_))
    ));

    let mut nomination = Nomination::example(POLL_NOMINATION, VALAMI_AMERIKA, AGI, "Mert jo");
    nomination.vote_count = 17;
    let id = manager.save_nomination(nomination.clone()).await.unwrap();
    assert!(!id.is_empty());
    assert_eq!(vote_count(&manager, id), 0);

    let nomination_poll = poll(&manager, POLL_NOMINATION);
    assert_eq!(
        ids(manager.query_nominations(Some(&nomination_poll)).unwrap()),
        vec![NOMINATION_1, id]
    );

    // Replace the voted-on nomination; its count survives.
    let mut replaced = manager.query_nomination(VOTING_NOMINATION_2).unwrap().clone();
    replaced.text = "Nagyon vicces".to_string();
    replaced.vote_count = 0;
    manager.save_nomination(replaced).await.unwrap();
    let stored = manager.query_nomination(VOTING_NOMINATION_2).unwrap();
    assert_eq!(stored.text, "Nagyon vicces");
    assert_eq!(stored.vote_count, 1);
}

pub async fn delete_nomination(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    manager.delete_nomination(VOTING_NOMINATION_1).await.unwrap();
    manager.delete_nomination(VOTING_NOMINATION_1).await.unwrap();
    assert!(manager.query_nomination(VOTING_NOMINATION_1).is_none());
    assert_eq!(
        ids(manager.query_nominations(Some(&voting)).unwrap()),
        vec![VOTING_NOMINATION_2]
    );
}

pub async fn query_polls(manager: DataManager) {
    let polls = manager.query_polls();
    assert_eq!(
        polls.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![POLL_NOMINATION, POLL_VOTING, POLL_DUPLICATES, POLL_CLOSED]
    );
    assert!(polls
        .windows(2)
        .all(|w| w[0].announcement_date > w[1].announcement_date));

    assert_eq!(
        manager.query_poll(POLL_CLOSED).unwrap().state,
        PollState::Closed
    );
    assert!(manager.query_poll(Id::random()).is_none());
}

pub async fn query_polls_by_state(manager: DataManager) {
    let in_state = |state| {
        manager
            .query_polls_by_state(state)
            .into_iter()
            .map(|p| p.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(
        in_state(PollState::Nomination),
        vec![POLL_NOMINATION, POLL_DUPLICATES]
    );
    assert_eq!(in_state(PollState::Voting), vec![POLL_VOTING]);
    assert_eq!(in_state(PollState::Closed), vec![POLL_CLOSED]);
}

pub async fn save_poll(mut manager: DataManager) {
    let id = manager
        .save_poll(Poll::example("Legjobb sorozat", 30))
        .await
        .unwrap();
    assert!(!id.is_empty());
    assert_eq!(manager.query_polls()[0].id, id);

    let mut voting = poll(&manager, id);
    voting.state = PollState::Voting;
    manager.save_poll(voting).await.unwrap();
    assert_eq!(
        manager
            .query_polls_by_state(PollState::Voting)
            .into_iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
        vec![id, POLL_VOTING]
    );
    assert_eq!(manager.query_polls().len(), 5);
}

pub async fn delete_poll_keeps_nominations(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    manager.delete_poll(POLL_VOTING).await.unwrap();
    manager.delete_poll(POLL_VOTING).await.unwrap();

    assert!(manager.query_poll(POLL_VOTING).is_none());
    assert_eq!(manager.query_polls().len(), 3);
    assert!(manager.query_nomination(VOTING_NOMINATION_1).is_some());
    assert_eq!(manager.query_nominations(Some(&voting)).unwrap().len(), 2);
}

pub async fn search_poll_subjects(manager: DataManager) {
    let found = |term| {
        manager
            .search_poll_subjects(Some(term))
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(found("Valami"), vec![VALAMI_AMERIKA, VALAMI_AMERIKA_2]);
    assert_eq!(found("Valami Amerika 2"), vec![VALAMI_AMERIKA_2]);
    assert_eq!(found("valami"), Vec::<i64>::new());
    assert_eq!(found("").len(), 3);
    assert!(matches!(
        manager.search_poll_subjects(None),
        Err(Error::InvalidArgument(_))
    ));

    assert_eq!(
        manager.query_poll_subject(EHEZOK_VIADALA).unwrap().year,
        2013
    );
}

pub async fn save_poll_subject(mut manager: DataManager) {
    manager
        .save_poll_subject(PollSubject::example(EHEZOK_VIADALA, "Az ehezok viadala", 2012))
        .await
        .unwrap();
    manager
        .save_poll_subject(PollSubject::example(50, "Uj film", 2023))
        .await
        .unwrap();

    let subject = manager.query_poll_subject(EHEZOK_VIADALA).unwrap();
    assert_eq!(subject.title, "Az ehezok viadala");
    assert_eq!(subject.year, 2012);
    assert_eq!(manager.search_poll_subjects(Some("")).unwrap().len(), 4);
}

pub async fn save_poll_subjects_batch(mut manager: DataManager) {
    let subjects: Vec<PollSubject> = (0..1503)
        .map(|i| PollSubject::example(1000 + i, &format!("z Film #{i}"), 2000))
        .collect();
    manager.save_poll_subjects_batch(subjects).await.unwrap();

    let found = manager.search_poll_subjects(Some("z Film #")).unwrap();
    assert_eq!(found.len(), 1503);
    assert_eq!(found[0].id, 1000);
    assert_eq!(found[1502].id, 2502);

    // Saving the same batch again replaces rather than duplicates.
    let again: Vec<PollSubject> = (0..3)
        .map(|i| PollSubject::example(1000 + i, "z Film (javitott)", 2001))
        .collect();
    manager.save_poll_subjects_batch(again).await.unwrap();
    assert_eq!(manager.search_poll_subjects(Some("z Film")).unwrap().len(), 1503);
    assert_eq!(manager.query_poll_subject(1001).unwrap().year, 2001);

    manager.save_poll_subjects_batch(Vec::new()).await.unwrap();
}

pub async fn delete_poll_subject(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    manager.delete_poll_subject(VALAMI_AMERIKA_2).await.unwrap();
    manager.delete_poll_subject(VALAMI_AMERIKA_2).await.unwrap();
    assert!(manager.query_poll_subject(VALAMI_AMERIKA_2).is_none());

    // The nomination whose subject is gone now sorts first.
    assert_eq!(
        ids(manager.query_nominations(Some(&voting)).unwrap()),
        vec![VOTING_NOMINATION_2, VOTING_NOMINATION_1]
    );
}

pub async fn query_banned_users(manager: DataManager) {
    let names: Vec<&str> = manager
        .query_banned_users()
        .into_iter()
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(names, vec!["Noemi"]);
}

pub async fn search_users(manager: DataManager) {
    let names = |term| {
        manager
            .search_users(Some(term))
            .unwrap()
            .into_iter()
            .map(|u| u.name.as_str())
            .collect::<Vec<_>>()
    };
    assert_eq!(names("A"), vec!["Agi", "Admin"]);
    assert_eq!(names("Ad"), vec!["Admin"]);
    assert!(names("a").is_empty());
    assert!(matches!(
        manager.search_users(None),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(manager.query_user(NOEMI).unwrap().name, "Noemi");
    assert!(manager.query_user(Id::random()).is_none());
}

pub async fn save_and_delete_user(mut manager: DataManager) {
    let id = manager.save_user(User::example("Zoli")).await.unwrap();
    assert!(!id.is_empty());

    let mut banned = user(&manager, id);
    banned.is_banned = true;
    manager.save_user(banned).await.unwrap();
    let names: Vec<&str> = manager
        .query_banned_users()
        .into_iter()
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(names, vec!["Noemi", "Zoli"]);

    // Nominations outlive their user.
    let lali = user(&manager, LALI);
    manager.delete_user(LALI).await.unwrap();
    manager.delete_user(LALI).await.unwrap();
    assert!(manager.query_user(LALI).is_none());
    assert_eq!(
        manager.query_nominations_by_user(Some(&lali)).unwrap().len(),
        4
    );
}

pub async fn query_vote(manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    let closed = poll(&manager, POLL_CLOSED);
    let agi = user(&manager, AGI);
    let lali = user(&manager, LALI);

    let vote = manager.query_vote(Some(&voting), Some(&agi)).unwrap().unwrap();
    assert_eq!(vote.nomination, VOTING_NOMINATION_2);
    let vote = manager.query_vote(Some(&closed), Some(&agi)).unwrap().unwrap();
    assert_eq!(vote.nomination, CLOSED_NOMINATION_1);
    assert!(manager
        .query_vote(Some(&voting), Some(&lali))
        .unwrap()
        .is_none());

    let unsaved_poll = Poll::example("Unsaved", 1);
    assert!(matches!(
        manager.query_vote(Some(&unsaved_poll), Some(&agi)),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        manager.query_vote(Some(&voting), Some(&User::example("Ghost"))),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        manager.query_vote(None, Some(&agi)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.query_vote(Some(&voting), None),
        Err(Error::InvalidArgument(_))
    ));
}

pub async fn query_vote_reports_duplicates(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    let agi = user(&manager, AGI);

    // Only reachable by bypassing save_vote.
    let tables = manager.data_model_mut().tables_mut();
    tables.votes.upsert(Vote::example(VOTING_NOMINATION_1, AGI));
    tables.refresh_relational_lists();

    assert!(matches!(
        manager.query_vote(Some(&voting), Some(&agi)),
        Err(Error::Ambiguous(_))
    ));
}

pub async fn save_vote_replaces_vote_in_same_poll(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    let agi = user(&manager, AGI);
    let lali = user(&manager, LALI);

    manager
        .save_vote(Vote::example(VOTING_NOMINATION_1, LALI))
        .await
        .unwrap();
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_1), 1);
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_2), 1);

    // Agi changes her mind within the poll; her closed-poll vote stays.
    manager
        .save_vote(Vote::example(VOTING_NOMINATION_1, AGI))
        .await
        .unwrap();
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_1), 2);
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_2), 0);
    assert_eq!(vote_count(&manager, CLOSED_NOMINATION_1), 1);
    let vote = manager.query_vote(Some(&voting), Some(&agi)).unwrap().unwrap();
    assert_eq!(vote.nomination, VOTING_NOMINATION_1);

    // Re-voting for the same nomination only refreshes the vote.
    let date = Utc::now() + Duration::hours(1);
    manager
        .save_vote(Vote {
            nomination: VOTING_NOMINATION_1,
            user: LALI,
            date,
        })
        .await
        .unwrap();
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_1), 2);
    let vote = manager.query_vote(Some(&voting), Some(&lali)).unwrap().unwrap();
    assert_eq!(vote.date, date);
}

pub async fn save_vote_requires_nomination_and_poll(mut manager: DataManager) {
    assert!(matches!(
        manager.save_vote(Vote::example(Id::random(), AGI)).await,
        Err(Error::NotFound(_))
    ));

    manager.delete_poll(POLL_VOTING).await.unwrap();
    assert!(matches!(
        manager
            .save_vote(Vote::example(VOTING_NOMINATION_1, LALI))
            .await,
        Err(Error::NotFound(_))
    ));
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_1), 0);
}

pub async fn delete_vote(mut manager: DataManager) {
    let voting = poll(&manager, POLL_VOTING);
    let agi = user(&manager, AGI);

    manager.delete_vote(VOTING_NOMINATION_2, AGI).await.unwrap();
    manager.delete_vote(VOTING_NOMINATION_2, AGI).await.unwrap();
    assert_eq!(vote_count(&manager, VOTING_NOMINATION_2), 0);
    assert!(manager
        .query_vote(Some(&voting), Some(&agi))
        .unwrap()
        .is_none());
}
