pub mod bounding_box;
pub mod example_sentence;
pub mod photo;
pub mod word_object;

pub use bounding_box::BoundingBox;
pub use example_sentence::{ExampleSentence, NewExampleSentence};
pub use photo::{NewPhoto, Photo, REMOTE_PLACEHOLDER_PATH};
pub use word_object::{vocabulary_key, NewWordObject, WordObject, PENDING_MEANING};
