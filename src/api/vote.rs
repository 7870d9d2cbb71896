use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        id::{NominationId, PollId, UserId},
        nomination::Vote,
    },
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![get_vote, save_vote, delete_vote]
}

/// The user's vote in the poll, or `null` if they have not voted.
#[get("/polls/<poll_id>/votes/<user_id>")]
async fn get_vote(
    poll_id: PollId,
    user_id: UserId,
    data: &State<ManagedData>,
) -> Result<Json<Option<Vote>>> {
    let manager = data.read().await;
    let poll = manager
        .query_poll(poll_id)
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;
    let user = manager
        .query_user(user_id)
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;
    let vote = manager.query_vote(Some(poll), Some(user))?;
    Ok(Json(vote.cloned()))
}

/// Cast a vote, replacing the user's earlier vote in the same poll.
#[post("/votes", data = "<vote>", format = "json")]
async fn save_vote(vote: Json<Vote>, data: &State<ManagedData>) -> Result<()> {
    data.write().await.save_vote(vote.0).await
}

#[delete("/votes/<nomination_id>/<user_id>")]
async fn delete_vote(
    nomination_id: NominationId,
    user_id: UserId,
    data: &State<ManagedData>,
) -> Result<()> {
    data.write().await.delete_vote(nomination_id, user_id).await
}
