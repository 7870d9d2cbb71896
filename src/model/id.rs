use std::{fmt, str::FromStr};

use rocket::{
    http::{
        impl_from_uri_param_identity,
        uri::fmt::{Path, UriDisplay},
    },
    request::FromParam,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 128-bit random identifier for users, polls, nominations and news.
///
/// The nil value is the "empty" sentinel: an entity saved with it is new and
/// gets a freshly minted identifier.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Id(Uuid);

pub type UserId = Id;
pub type PollId = Id;
pub type NominationId = Id;
pub type NewsId = Id;

/// Poll subjects are reference data keyed by caller-assigned integers.
pub type PollSubjectId = i64;

impl Id {
    pub const EMPTY: Id = Id(Uuid::nil());

    /// A new random identifier. Never returns [`Id::EMPTY`], since a v4
    /// UUID always has its version bits set.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// A fixed identifier, e.g. for well-known sample data.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for Id {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = uuid::Error;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse::<Id>()
    }
}

impl UriDisplay<Path> for Id {
    fn fmt(&self, formatter: &mut rocket::http::uri::fmt::Formatter<'_, Path>) -> fmt::Result {
        formatter.write_value(self.to_string())
    }
}

impl_from_uri_param_identity!([Path] Id);
