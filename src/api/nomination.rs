use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::NominationDescription,
        id::{NominationId, PollId, UserId},
        nomination::Nomination,
        DataManager,
    },
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_poll_nominations,
        get_poll_nominations_by_user,
        get_user_nominations,
        get_nomination,
        save_nomination,
        delete_nomination,
    ]
}

fn describe(manager: &DataManager, nominations: Vec<&Nomination>) -> Json<Vec<NominationDescription>> {
    let tables = manager.tables();
    Json(
        nominations
            .into_iter()
            .map(|n| NominationDescription::new(n, tables))
            .collect(),
    )
}

/// Ordered by subject title, then subject year.
#[get("/polls/<id>/nominations")]
async fn get_poll_nominations(
    id: PollId,
    data: &State<ManagedData>,
) -> Result<Json<Vec<NominationDescription>>> {
    let manager = data.read().await;
    let poll = manager.query_poll(id);
    if poll.is_none() {
        return Err(Error::not_found(format!("Poll {id}")));
    }
    let nominations = manager.query_nominations(poll)?;
    Ok(describe(&manager, nominations))
}

#[get("/polls/<id>/nominations/<user_id>")]
async fn get_poll_nominations_by_user(
    id: PollId,
    user_id: UserId,
    data: &State<ManagedData>,
) -> Result<Json<Vec<NominationDescription>>> {
    let manager = data.read().await;
    let poll = manager
        .query_poll(id)
        .ok_or_else(|| Error::not_found(format!("Poll {id}")))?;
    let user = manager
        .query_user(user_id)
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;
    let nominations = manager.query_nominations_by_poll_and_user(Some(poll), Some(user))?;
    Ok(describe(&manager, nominations))
}

/// Every nomination the user made. A user without nominations is a 404.
#[get("/users/<id>/nominations")]
async fn get_user_nominations(
    id: UserId,
    data: &State<ManagedData>,
) -> Result<Json<Vec<NominationDescription>>> {
    let manager = data.read().await;
    let user = manager
        .query_user(id)
        .ok_or_else(|| Error::not_found(format!("User {id}")))?;
    let nominations = manager.query_nominations_by_user(Some(user))?;
    Ok(describe(&manager, nominations))
}

#[get("/nominations/<id>")]
async fn get_nomination(
    id: NominationId,
    data: &State<ManagedData>,
) -> Option<Json<NominationDescription>> {
    let manager = data.read().await;
    let nomination = manager.query_nomination(id)?;
    Some(Json(NominationDescription::new(nomination, manager.tables())))
}

#[post("/nominations", data = "<nomination>", format = "json")]
async fn save_nomination(
    nomination: Json<Nomination>,
    data: &State<ManagedData>,
) -> Result<Json<NominationId>> {
    let id = data.write().await.save_nomination(nomination.0).await?;
    Ok(Json(id))
}

/// Votes on the nomination are kept.
#[delete("/nominations/<id>")]
async fn delete_nomination(id: NominationId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.delete_nomination(id).await
}
