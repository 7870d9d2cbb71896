#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{tokio::sync::RwLock, Build, Rocket};

pub mod api;
mod config;
pub mod error;
mod logging;
pub mod model;

pub use config::{Config, Storage};

use config::StorageFairing;
use logging::LoggerFairing;
use model::DataManager;

/// The data manager as managed state. Queries share the lock, writes take it
/// exclusively, so every write is visible to the next query.
pub type ManagedData = RwLock<DataManager>;

/// Build the server with the backend chosen by configuration.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(StorageFairing)
}

/// Build the server around an existing data manager.
pub fn rocket_for_manager(manager: DataManager) -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .manage(ManagedData::new(manager))
}

/// Connect to the database server named by `db_uri`.
#[cfg(test)]
async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .unwrap_or_else(|e| panic!("Could not connect to database with `db_uri` \"{db_uri}\": {e}"))
}

/// A fresh database name for one test.
#[cfg(test)]
fn database() -> String {
    config::get_database_name()
}
