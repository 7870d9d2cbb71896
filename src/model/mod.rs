//! The poll data: entities, the tables holding them, the storage backends,
//! and the [`DataManager`] that serves every query and mutation.

pub mod api;
mod data_model;
pub mod id;
mod manager;
mod memory;
pub mod mongodb;
pub mod news;
pub mod nomination;
pub mod poll;
pub mod sample;
pub mod table;
pub mod tables;
pub mod user;

pub use data_model::DataModel;
pub use manager::DataManager;
pub use memory::MemoryDataModel;
pub use mongodb::MongoDataModel;
pub use tables::Tables;
