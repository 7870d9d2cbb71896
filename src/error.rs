use log::{error, warn};
use mongodb::bson::{de::Error as BsonDeError, ser::Error as BsonSerError};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was absent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Something the operation has to join through does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Several rows exist where storage guarantees at most one.
    #[error("Ambiguous state: {0}")]
    Ambiguous(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    BsonSer(#[from] BsonSerError),
    #[error(transparent)]
    BsonDe(#[from] BsonDeError),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::Ambiguous(msg.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidArgument(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Ambiguous(_) | Self::Db(_) | Self::BsonSer(_) | Self::BsonDe(_) => {
                Status::InternalServerError
            }
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let id = RequestId::of(req);
        if status.code >= 500 {
            error!("req{id}: {self}");
        } else {
            warn!("req{id}: {self}");
        }
        Err(status)
    }
}
