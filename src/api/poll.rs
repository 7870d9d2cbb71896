use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        id::PollId,
        poll::{Poll, PollState},
    },
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![get_polls, get_poll, save_poll, delete_poll]
}

/// Latest announcement first, optionally only those in one state.
#[get("/polls?<state>")]
async fn get_polls(state: Option<PollState>, data: &State<ManagedData>) -> Json<Vec<Poll>> {
    let manager = data.read().await;
    let polls = match state {
        Some(state) => manager.query_polls_by_state(state),
        None => manager.query_polls(),
    };
    Json(polls.into_iter().cloned().collect())
}

#[get("/polls/<id>")]
async fn get_poll(id: PollId, data: &State<ManagedData>) -> Option<Json<Poll>> {
    let manager = data.read().await;
    manager.query_poll(id).cloned().map(Json)
}

#[post("/polls", data = "<poll>", format = "json")]
async fn save_poll(poll: Json<Poll>, data: &State<ManagedData>) -> Result<Json<PollId>> {
    let id = data.write().await.save_poll(poll.0).await?;
    Ok(Json(id))
}

/// Nominations of the poll are kept.
#[delete("/polls/<id>")]
async fn delete_poll(id: PollId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.delete_poll(id).await
}
