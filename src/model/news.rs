use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{id::NewsId, table::Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    #[serde(default)]
    pub id: NewsId,
    pub title: String,
    pub text: String,
    pub publication_date: DateTime<Utc>,
}

impl Record for News {
    type Key = NewsId;

    fn key(&self) -> NewsId {
        self.id
    }
}
