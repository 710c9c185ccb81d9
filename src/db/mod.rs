pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use models::{
    vocabulary_key, BoundingBox, ExampleSentence, NewExampleSentence, NewPhoto, NewWordObject,
    Photo, WordObject, PENDING_MEANING, REMOTE_PLACEHOLDER_PATH,
};
