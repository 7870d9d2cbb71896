use chrono::Utc;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{sample, DataManager, MemoryDataModel, MongoDataModel};
use crate::ManagedData;

/// Which backend holds the data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// Nothing survives a restart.
    #[default]
    Memory,
    MongoDb,
}

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    storage: Storage,
    #[serde(default)]
    sample_data: bool,
    // secrets
    db_uri: Option<String>,
}

impl Config {
    /// The configured backend.
    pub fn storage(&self) -> Storage {
        self.storage
    }

    /// Whether the sample data set replaces all data at startup.
    pub fn sample_data(&self) -> bool {
        self.sample_data
    }
}

/// A fairing that loads the application config, opens the configured
/// backend, and places both the `Config` and the [`ManagedData`] into
/// managed state.
pub struct StorageFairing;

impl StorageFairing {
    async fn open(config: &Config) -> Result<DataManager, String> {
        let mut manager = match config.storage {
            Storage::Memory => DataManager::new(MemoryDataModel::new()),
            Storage::MongoDb => {
                let db_uri = config
                    .db_uri
                    .as_deref()
                    .ok_or("`db_uri` must be set when `storage` is \"mongodb\"")?;
                info!("Connecting to database...");
                let client = MongoClient::with_uri_str(db_uri)
                    .await
                    .map_err(|e| format!("Failed to connect to database: {e}"))?;
                let db = client.database(&get_database_name());
                let model = MongoDataModel::open(db)
                    .await
                    .map_err(|e| format!("Failed to read database: {e}"))?;
                info!("...database connection online!");
                DataManager::new(model)
            }
        };

        if config.sample_data {
            manager
                .load(sample::sample_tables(Utc::now()))
                .await
                .map_err(|e| format!("Failed to load sample data: {e}"))?;
        }
        Ok(manager)
    }
}

#[rocket::async_trait]
impl Fairing for StorageFairing {
    fn info(&self) -> Info {
        Info {
            name: "Storage",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Using {:?} storage", config.storage);

        let manager = match Self::open(&config).await {
            Ok(manager) => manager,
            Err(e) => {
                error!("{e}");
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config).manage(ManagedData::new(manager));
        Ok(rocket)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
pub(crate) fn get_database_name() -> String {
    "nominate".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}
