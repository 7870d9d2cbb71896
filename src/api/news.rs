use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        id::NewsId,
        news::News,
    },
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![get_news, get_news_item, save_news, delete_news]
}

/// Newest first.
#[get("/news")]
async fn get_news(data: &State<ManagedData>) -> Json<Vec<News>> {
    let manager = data.read().await;
    Json(manager.query_news().into_iter().cloned().collect())
}

#[get("/news/<id>")]
async fn get_news_item(id: NewsId, data: &State<ManagedData>) -> Option<Json<News>> {
    let manager = data.read().await;
    manager.query_news_by_id(id).cloned().map(Json)
}

#[post("/news", data = "<news>", format = "json")]
async fn save_news(news: Json<News>, data: &State<ManagedData>) -> Result<Json<NewsId>> {
    let id = data.write().await.save_news(news.0).await?;
    Ok(Json(id))
}

#[delete("/news/<id>")]
async fn delete_news(id: NewsId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.delete_news(id).await
}
