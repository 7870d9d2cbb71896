use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{id::UserId, user::User},
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_user,
        search_users,
        get_banned_users,
        get_is_admin,
        save_user,
        delete_user,
    ]
}

#[get("/users/<id>")]
async fn get_user(id: UserId, data: &State<ManagedData>) -> Option<Json<User>> {
    let manager = data.read().await;
    manager.query_user(id).cloned().map(Json)
}

/// Users whose name starts with `term`. The term is required.
#[get("/users?<term>")]
async fn search_users(term: Option<&str>, data: &State<ManagedData>) -> Result<Json<Vec<User>>> {
    let manager = data.read().await;
    let users = manager.search_users(term)?;
    Ok(Json(users.into_iter().cloned().collect()))
}

#[get("/users/banned")]
async fn get_banned_users(data: &State<ManagedData>) -> Json<Vec<User>> {
    let manager = data.read().await;
    Json(manager.query_banned_users().into_iter().cloned().collect())
}

#[get("/users/<id>/admin")]
async fn get_is_admin(id: UserId, data: &State<ManagedData>) -> Result<Json<bool>> {
    let manager = data.read().await;
    let user = manager.query_user(id);
    if user.is_none() {
        return Err(Error::not_found(format!("User {id}")));
    }
    Ok(Json(manager.is_admin(user)?))
}

#[post("/users", data = "<user>", format = "json")]
async fn save_user(user: Json<User>, data: &State<ManagedData>) -> Result<Json<UserId>> {
    let id = data.write().await.save_user(user.0).await?;
    Ok(Json(id))
}

#[delete("/users/<id>")]
async fn delete_user(id: UserId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.delete_user(id).await
}
