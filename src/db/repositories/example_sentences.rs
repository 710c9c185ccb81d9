use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    models::{ExampleSentence, NewExampleSentence},
};

fn row_to_sentence(row: &Row) -> Result<ExampleSentence> {
    Ok(ExampleSentence {
        id: row.get("id")?,
        word_object_id: row.get("word_object_id")?,
        sentence: row.get("sentence")?,
        translation: row.get("translation")?,
    })
}

impl Database {
    pub async fn insert_example_sentence(
        &self,
        sentence: &NewExampleSentence,
    ) -> Result<ExampleSentence> {
        let record = sentence.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO example_sentences (word_object_id, sentence, translation)
                 VALUES (?1, ?2, ?3)",
                params![record.word_object_id, record.sentence, record.translation],
            )?;

            Ok(ExampleSentence {
                id: conn.last_insert_rowid(),
                word_object_id: record.word_object_id,
                sentence: record.sentence,
                translation: record.translation,
            })
        })
        .await
    }

    pub async fn get_all_example_sentences(&self) -> Result<Vec<ExampleSentence>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, word_object_id, sentence, translation
                 FROM example_sentences
                 ORDER BY id",
            )?;

            let mut rows = stmt.query([])?;
            let mut sentences = Vec::new();
            while let Some(row) = rows.next()? {
                sentences.push(row_to_sentence(row)?);
            }
            Ok(sentences)
        })
        .await
    }

    pub async fn get_example_sentences_for_word_object(
        &self,
        word_object_id: i64,
    ) -> Result<Vec<ExampleSentence>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, word_object_id, sentence, translation
                 FROM example_sentences
                 WHERE word_object_id = ?1
                 ORDER BY id",
            )?;

            let mut rows = stmt.query(params![word_object_id])?;
            let mut sentences = Vec::new();
            while let Some(row) = rows.next()? {
                sentences.push(row_to_sentence(row)?);
            }
            Ok(sentences)
        })
        .await
    }
}
