use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{id::PollSubjectId, poll::PollSubject},
    ManagedData,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_subject,
        search_subjects,
        save_subject,
        save_subjects_batch,
        delete_subject,
    ]
}

#[get("/subjects/<id>")]
async fn get_subject(id: PollSubjectId, data: &State<ManagedData>) -> Option<Json<PollSubject>> {
    let manager = data.read().await;
    manager.query_poll_subject(id).cloned().map(Json)
}

/// Subjects whose title starts with `term`. The term is required.
#[get("/subjects?<term>")]
async fn search_subjects(
    term: Option<&str>,
    data: &State<ManagedData>,
) -> Result<Json<Vec<PollSubject>>> {
    let manager = data.read().await;
    let subjects = manager.search_poll_subjects(term)?;
    Ok(Json(subjects.into_iter().cloned().collect()))
}

#[post("/subjects", data = "<subject>", format = "json")]
async fn save_subject(subject: Json<PollSubject>, data: &State<ManagedData>) -> Result<()> {
    data.write().await.save_poll_subject(subject.0).await
}

#[post("/subjects/batch", data = "<subjects>", format = "json")]
async fn save_subjects_batch(
    subjects: Json<Vec<PollSubject>>,
    data: &State<ManagedData>,
) -> Result<()> {
    data.write().await.save_poll_subjects_batch(subjects.0).await
}

#[delete("/subjects/<id>")]
async fn delete_subject(id: PollSubjectId, data: &State<ManagedData>) -> Result<()> {
    data.write().await.delete_poll_subject(id).await
}
