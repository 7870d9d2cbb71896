use log::{debug, error, info};

use crate::error::{Error, Result};
use crate::model::{
    data_model::DataModel,
    id::{Id, NewsId, NominationId, PollId, PollSubjectId, UserId},
    news::News,
    nomination::{Nomination, Vote, VoteKey},
    poll::{Poll, PollState, PollSubject},
    table::{Record, Table},
    tables::{Change, Key, Row, Tables},
    user::{Administrator, User},
};

#[cfg(test)]
pub(crate) mod conformance;

/// All queries and mutations over the poll data.
///
/// Reads scan the backend's in-memory tables. Writes go through
/// [`DataModel::commit`], so a persistent backend has made them durable by
/// the time the call returns, and they are visible to the next query.
///
/// Entities keyed by a random [`Id`] are created by saving them with
/// [`Id::EMPTY`]; saving with any other id replaces whatever was stored under
/// it, in full.
pub struct DataManager {
    model: Box<dyn DataModel>,
}

impl DataManager {
    pub fn new(model: impl DataModel + 'static) -> Self {
        Self::from_boxed(Box::new(model))
    }

    pub fn from_boxed(model: Box<dyn DataModel>) -> Self {
        Self { model }
    }

    pub fn data_model(&self) -> &dyn DataModel {
        self.model.as_ref()
    }

    pub fn data_model_mut(&mut self) -> &mut dyn DataModel {
        self.model.as_mut()
    }

    pub fn tables(&self) -> &Tables {
        self.model.tables()
    }

    /// Remove all data.
    pub async fn reset(&mut self) -> Result<()> {
        info!("Resetting {} data model", self.model.name());
        self.model.reset().await
    }

    /// Replace all data with the given set.
    pub async fn load(&mut self, tables: Tables) -> Result<()> {
        info!(
            "Loading {} users, {} polls and {} nominations into {} data model",
            tables.users.len(),
            tables.polls.len(),
            tables.nominations.len(),
            self.model.name()
        );
        self.model.load(tables).await
    }

    async fn upsert(&mut self, row: impl Into<Row>) -> Result<()> {
        self.model.commit(vec![Change::upsert(row)]).await
    }

    /// Delete the row with `key` if it is stored; absent keys are not an error.
    async fn delete(&mut self, key: Key, present: bool) -> Result<()> {
        if !present {
            debug!("Nothing to delete for {key:?}");
            return Ok(());
        }
        debug!("Deleting {key:?}");
        self.model.commit(vec![Change::Delete(key)]).await
    }

    // Administrators

    pub fn is_admin(&self, user: Option<&User>) -> Result<bool> {
        let user = user.ok_or_else(|| Error::invalid_argument("The user must not be absent"))?;
        Ok(self.tables().administrators.contains_key(&user.id))
    }

    pub fn query_administrators(&self) -> Vec<&Administrator> {
        self.tables().administrators.iter().collect()
    }

    /// Give a stored user admin capability.
    pub async fn grant_admin(&mut self, user_id: UserId) -> Result<()> {
        if !self.tables().users.contains_key(&user_id) {
            return Err(Error::not_found(format!("User {user_id}")));
        }
        debug!("Granting admin to user {user_id}");
        self.upsert(Administrator { user_id }).await
    }

    pub async fn revoke_admin(&mut self, user_id: UserId) -> Result<()> {
        let present = self.tables().administrators.contains_key(&user_id);
        self.delete(Key::Administrator(user_id), present).await
    }

    // News

    /// All news, newest first.
    pub fn query_news(&self) -> Vec<&News> {
        let mut news: Vec<&News> = self.tables().news.iter().collect();
        news.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
        news
    }

    pub fn query_news_by_id(&self, id: NewsId) -> Option<&News> {
        self.tables().news.get(&id)
    }

    pub async fn save_news(&mut self, mut news: News) -> Result<NewsId> {
        if news.id.is_empty() {
            news.id = fresh_id(&self.tables().news);
        }
        let id = news.id;
        debug!("Saving news {id}");
        self.upsert(news).await?;
        Ok(id)
    }

    pub async fn delete_news(&mut self, id: NewsId) -> Result<()> {
        let present = self.tables().news.contains_key(&id);
        self.delete(Key::News(id), present).await
    }

    // Nominations

    /// The poll's nominations, ordered by subject title then subject year.
    pub fn query_nominations(&self, poll: Option<&Poll>) -> Result<Vec<&Nomination>> {
        let poll = poll.ok_or_else(|| Error::invalid_argument("The poll must not be absent"))?;
        Ok(self.by_subject(self.tables().nominations_of(poll.id)))
    }

    /// The poll's nominations proposed by `user`, ordered as
    /// [`DataManager::query_nominations`]. Nominations without a user never match.
    pub fn query_nominations_by_poll_and_user(
        &self,
        poll: Option<&Poll>,
        user: Option<&User>,
    ) -> Result<Vec<&Nomination>> {
        let poll = poll.ok_or_else(|| Error::invalid_argument("The poll must not be absent"))?;
        let user = user.ok_or_else(|| Error::invalid_argument("The user must not be absent"))?;
        let nominations = self
            .tables()
            .nominations_of(poll.id)
            .filter(|n| n.user == Some(user.id));
        Ok(self.by_subject(nominations))
    }

    /// Every nomination proposed by `user`, across all polls, in storage
    /// order.
    ///
    /// The user is not looked up; a user with no nominations, stored or not,
    /// is reported as [`Error::NotFound`].
    pub fn query_nominations_by_user(&self, user: Option<&User>) -> Result<Vec<&Nomination>> {
        let user = user.ok_or_else(|| Error::invalid_argument("The user must not be absent"))?;
        let nominations: Vec<&Nomination> = self
            .tables()
            .nominations
            .iter()
            .filter(|n| n.user == Some(user.id))
            .collect();
        if nominations.is_empty() {
            return Err(Error::not_found(format!("Nominations by user {}", user.id)));
        }
        Ok(nominations)
    }

    pub fn query_nomination(&self, id: NominationId) -> Option<&Nomination> {
        self.tables().nominations.get(&id)
    }

    /// Save a nomination. Its vote count is derived from the stored votes;
    /// the supplied value is ignored.
    pub async fn save_nomination(&mut self, mut nomination: Nomination) -> Result<NominationId> {
        if nomination.user.is_none() {
            return Err(Error::invalid_argument(
                "The nomination's user must not be absent",
            ));
        }
        if nomination.id.is_empty() {
            nomination.id = fresh_id(&self.tables().nominations);
        }
        let id = nomination.id;
        debug!("Saving nomination {id} in poll {}", nomination.poll);
        self.upsert(nomination).await?;
        Ok(id)
    }

    /// Delete a nomination. Votes on it are left in place.
    pub async fn delete_nomination(&mut self, id: NominationId) -> Result<()> {
        let present = self.tables().nominations.contains_key(&id);
        self.delete(Key::Nomination(id), present).await
    }

    fn by_subject<'a>(&'a self, nominations: impl Iterator<Item = &'a Nomination>) -> Vec<&'a Nomination> {
        let subjects = &self.tables().poll_subjects;
        let mut nominations: Vec<&Nomination> = nominations.collect();
        // Nominations with a missing subject sort first.
        nominations.sort_by_key(|n| {
            subjects
                .get(&n.subject)
                .map(|s| (s.title.as_str(), s.year))
        });
        nominations
    }

    // Polls

    /// All polls, latest announcement first.
    pub fn query_polls(&self) -> Vec<&Poll> {
        self.polls_where(|_| true)
    }

    /// Polls in the given state, latest announcement first.
    pub fn query_polls_by_state(&self, state: PollState) -> Vec<&Poll> {
        self.polls_where(|poll| poll.state == state)
    }

    fn polls_where(&self, filter: impl Fn(&Poll) -> bool) -> Vec<&Poll> {
        let mut polls: Vec<&Poll> = self.tables().polls.iter().filter(|p| filter(p)).collect();
        polls.sort_by(|a, b| b.announcement_date.cmp(&a.announcement_date));
        polls
    }

    pub fn query_poll(&self, id: PollId) -> Option<&Poll> {
        self.tables().polls.get(&id)
    }

    pub async fn save_poll(&mut self, mut poll: Poll) -> Result<PollId> {
        if poll.id.is_empty() {
            poll.id = fresh_id(&self.tables().polls);
        }
        let id = poll.id;
        debug!("Saving poll {id} ({:?})", poll.state);
        self.upsert(poll).await?;
        Ok(id)
    }

    /// Delete a poll. Its nominations are orphaned, not deleted.
    pub async fn delete_poll(&mut self, id: PollId) -> Result<()> {
        let present = self.tables().polls.contains_key(&id);
        self.delete(Key::Poll(id), present).await
    }

    // Poll subjects

    pub fn query_poll_subject(&self, id: PollSubjectId) -> Option<&PollSubject> {
        self.tables().poll_subjects.get(&id)
    }

    /// Subjects whose title starts with `term` (case-sensitive).
    pub fn search_poll_subjects(&self, term: Option<&str>) -> Result<Vec<&PollSubject>> {
        let term =
            term.ok_or_else(|| Error::invalid_argument("The search term must not be absent"))?;
        Ok(self
            .tables()
            .poll_subjects
            .iter()
            .filter(|s| s.title.starts_with(term))
            .collect())
    }

    pub async fn save_poll_subject(&mut self, subject: PollSubject) -> Result<()> {
        debug!("Saving poll subject {}", subject.id);
        self.upsert(subject).await
    }

    /// Save many subjects in input order as a single backend write.
    pub async fn save_poll_subjects_batch(&mut self, subjects: Vec<PollSubject>) -> Result<()> {
        info!("Saving batch of {} poll subjects", subjects.len());
        let changes = subjects.into_iter().map(Change::upsert).collect();
        self.model.commit(changes).await
    }

    pub async fn delete_poll_subject(&mut self, id: PollSubjectId) -> Result<()> {
        let present = self.tables().poll_subjects.contains_key(&id);
        self.delete(Key::PollSubject(id), present).await
    }

    // Users

    pub fn query_banned_users(&self) -> Vec<&User> {
        self.tables().users.iter().filter(|u| u.is_banned).collect()
    }

    pub fn query_user(&self, id: UserId) -> Option<&User> {
        self.tables().users.get(&id)
    }

    /// Users whose name starts with `term` (case-sensitive).
    pub fn search_users(&self, term: Option<&str>) -> Result<Vec<&User>> {
        let term =
            term.ok_or_else(|| Error::invalid_argument("The search term must not be absent"))?;
        Ok(self
            .tables()
            .users
            .iter()
            .filter(|u| u.name.starts_with(term))
            .collect())
    }

    pub async fn save_user(&mut self, mut user: User) -> Result<UserId> {
        if user.id.is_empty() {
            user.id = fresh_id(&self.tables().users);
        }
        let id = user.id;
        debug!("Saving user {id}");
        self.upsert(user).await?;
        Ok(id)
    }

    /// Delete a user. Their nominations, votes and admin marker are kept.
    pub async fn delete_user(&mut self, id: UserId) -> Result<()> {
        let present = self.tables().users.contains_key(&id);
        self.delete(Key::User(id), present).await
    }

    // Votes

    /// The vote `user` cast in `poll`, or `None` if they have not voted.
    ///
    /// Both the poll and the user must be stored.
    pub fn query_vote(&self, poll: Option<&Poll>, user: Option<&User>) -> Result<Option<&Vote>> {
        let poll = poll.ok_or_else(|| Error::invalid_argument("The poll must not be absent"))?;
        let user = user.ok_or_else(|| Error::invalid_argument("The user must not be absent"))?;

        let tables = self.tables();
        if !tables.polls.contains_key(&poll.id) {
            return Err(Error::not_found(format!("Poll {}", poll.id)));
        }
        if !tables.users.contains_key(&user.id) {
            return Err(Error::not_found(format!("User {}", user.id)));
        }

        let mut votes = self.votes_in_poll(poll.id, user.id);
        let vote = votes.next();
        if votes.next().is_some() {
            error!("User {} holds several votes in poll {}", user.id, poll.id);
            return Err(Error::ambiguous(format!(
                "Several votes by user {} in poll {}",
                user.id, poll.id
            )));
        }
        Ok(vote)
    }

    /// Save a vote, replacing any earlier vote by the same user in the same
    /// poll, whichever nomination it was for.
    ///
    /// The nomination and its poll must be stored.
    pub async fn save_vote(&mut self, vote: Vote) -> Result<()> {
        let tables = self.tables();
        let nomination = tables
            .nominations
            .get(&vote.nomination)
            .ok_or_else(|| Error::not_found(format!("Nomination {}", vote.nomination)))?;
        let poll = tables
            .poll_of(nomination)
            .ok_or_else(|| Error::not_found(format!("Poll {}", nomination.poll)))?
            .id;

        let mut changes: Vec<Change> = self
            .votes_in_poll(poll, vote.user)
            .filter(|old| old.nomination != vote.nomination)
            .map(|old| Change::Delete(Key::Vote(old.key())))
            .collect();
        debug!(
            "Saving vote by user {} for nomination {}, replacing {} other vote(s)",
            vote.user,
            vote.nomination,
            changes.len()
        );
        changes.push(Change::upsert(vote));
        self.model.commit(changes).await
    }

    pub async fn delete_vote(&mut self, nomination: NominationId, user: UserId) -> Result<()> {
        let key = VoteKey { nomination, user };
        let present = self.tables().votes.contains_key(&key);
        self.delete(Key::Vote(key), present).await
    }

    fn votes_in_poll(&self, poll: PollId, user: UserId) -> impl Iterator<Item = &Vote> + '_ {
        let tables = self.tables();
        tables.votes.iter().filter(move |vote| {
            vote.user == user
                && tables
                    .nominations
                    .get(&vote.nomination)
                    .map_or(false, |n| n.poll == poll)
        })
    }
}

/// A random identifier not yet used in `table`.
fn fresh_id<T: Record<Key = Id>>(table: &Table<T>) -> Id {
    loop {
        let id = Id::random();
        if !table.contains_key(&id) {
            return id;
        }
    }
}
