//! Conversions between rows and stored documents.
//!
//! Every document carries its row key as `_id`, so a save is a replace by
//! `_id`. The key fields stay in the document as well; deserialising a row
//! ignores `_id`.

use mongodb::bson::{doc, to_bson, to_document, Bson, Document};
use serde::Serialize;

use super::collection::MongoCollection;
use crate::error::Result;
use crate::model::{
    table::Record,
    tables::{Key, Row},
};

/// A filter matching the document with the given `_id`.
pub fn id_filter(id: Bson) -> Document {
    doc! {"_id": id}
}

/// A filter matching the documents with any of the given `_id`s.
pub fn ids_filter(ids: Vec<Bson>) -> Document {
    doc! {"_id": {"$in": ids}}
}

/// Serialise a row for storage, without its derived fields.
pub fn record_document<T>(record: &T) -> Result<Document>
where
    T: Record + MongoCollection + Serialize,
    T::Key: Serialize,
{
    let mut document = to_document(record)?;
    for field in T::DERIVED_FIELDS {
        document.remove(field);
    }
    document.insert("_id", to_bson(&record.key())?);
    Ok(document)
}

pub fn row_document(row: &Row) -> Result<Document> {
    match row {
        Row::User(row) => record_document(row),
        Row::Administrator(row) => record_document(row),
        Row::PollSubject(row) => record_document(row),
        Row::Poll(row) => record_document(row),
        Row::Nomination(row) => record_document(row),
        Row::Vote(row) => record_document(row),
        Row::News(row) => record_document(row),
    }
}

/// The `_id` a row with this key is stored under.
pub fn key_bson(key: &Key) -> Result<Bson> {
    let id = match key {
        Key::User(id) | Key::Administrator(id) => to_bson(id)?,
        Key::Poll(id) | Key::Nomination(id) | Key::News(id) => to_bson(id)?,
        Key::PollSubject(id) => to_bson(id)?,
        Key::Vote(key) => to_bson(key)?,
    };
    Ok(id)
}
