use rocket::Route;

mod admin;
mod news;
mod nomination;
mod poll;
mod subject;
mod user;
mod vote;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(news::routes());
    routes.extend(nomination::routes());
    routes.extend(poll::routes());
    routes.extend(subject::routes());
    routes.extend(user::routes());
    routes.extend(vote::routes());
    routes
}

/// A local client serving the sample data from memory.
#[cfg(test)]
pub(crate) async fn sample_client() -> rocket::local::asynchronous::Client {
    use chrono::Utc;

    use crate::model::{sample, DataManager, MemoryDataModel};

    let manager = DataManager::new(MemoryDataModel::with_tables(sample::sample_tables(
        Utc::now(),
    )));
    rocket::local::asynchronous::Client::tracked(crate::rocket_for_manager(manager))
        .await
        .unwrap()
}
