mod backend;
mod bson;
mod collection;

pub use backend::{MongoDataModel, WRITE_BATCH_SIZE};
pub use collection::{collection_name, Coll, MongoCollection, ALL_COLLECTIONS};
