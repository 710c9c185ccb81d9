pub mod example_sentences;
pub mod photos;
pub mod word_objects;
