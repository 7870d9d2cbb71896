use chrono::Utc;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{id::UserId, sample, user::Administrator, DataManager},
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![
        ban_user,
        unban_user,
        get_administrators,
        grant_admin,
        revoke_admin,
        reset_data,
        load_sample_data,
    ]
}

/// Load the user, set their banned flag and save them back.
async fn set_banned(manager: &mut DataManager, id: UserId, is_banned: bool) -> Result<()> {
    let mut user = manager
        .query_user(id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("User {id}")))?;
    if user.is_banned == is_banned {
        return Ok(());
    }
    info!("Setting banned = {is_banned} for user {id}");
    user.is_banned = is_banned;
    manager.save_user(user).await?;
    Ok(())
}

#[post("/admin/users/<id>/ban")]
async fn ban_user(id: UserId, data: &State<ManagedData>) -> Result<()> {
    set_banned(&mut *data.write().await, id, true).await
}

#[post("/admin/users/<id>/unban")]
async fn unban_user(id: UserId, data: &State<ManagedData>) -> Result<()> {
    set_banned(&mut *data.write().await, id, false).await
}

#[get("/admin/administrators")]
async fn get_administrators(data: &State<ManagedData>) -> Json<Vec<Administrator>> {
    let manager = data.read().await;
    Json(manager.query_administrators().into_iter().copied().collect())
}

#[put("/admin/administrators/<id>")]
async fn grant_admin(id: UserId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.grant_admin(id).await
}

#[delete("/admin/administrators/<id>")]
async fn revoke_admin(id: UserId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.revoke_admin(id).await
}

/// Remove all data.
#[post("/admin/reset")]
async fn reset_data(data: &State<ManagedData>) -> Result<()> {
    warn!("Resetting all data");
    data.write().await.reset().await
}

/// Replace all data with the sample data set.
#[post("/admin/sample")]
async fn load_sample_data(data: &State<ManagedData>) -> Result<()> {
    warn!("Replacing all data with the sample data set");
    data.write()
        .await
        .load(sample::sample_tables(Utc::now()))
        .await
}
