use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{expect_one_row, normalize_last_studied},
    models::{vocabulary_key, NewWordObject, WordObject},
};

const SELECT_COLUMNS: &str =
    "SELECT id, photo_id, word, meaning, bounding_box, last_studied FROM word_objects";

fn row_to_word_object(row: &Row) -> Result<WordObject> {
    let last_studied: Option<i64> = row.get("last_studied")?;

    Ok(WordObject {
        id: row.get("id")?,
        photo_id: row.get("photo_id")?,
        word: row.get("word")?,
        meaning: row.get("meaning")?,
        bounding_box: row.get("bounding_box")?,
        last_studied: normalize_last_studied(last_studied),
    })
}

impl Database {
    pub async fn insert_word_object(&self, object: &NewWordObject) -> Result<WordObject> {
        let record = object.clone();
        let key = vocabulary_key(&record.word);
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO word_objects (photo_id, word, word_key, meaning, bounding_box, last_studied)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                params![
                    record.photo_id,
                    record.word,
                    key,
                    record.meaning,
                    record.bounding_box,
                ],
            )?;

            Ok(WordObject {
                id: conn.last_insert_rowid(),
                photo_id: record.photo_id,
                word: record.word,
                meaning: record.meaning,
                bounding_box: record.bounding_box,
                last_studied: 0,
            })
        })
        .await
    }

    /// All word objects in insertion order.
    pub async fn get_all_word_objects(&self) -> Result<Vec<WordObject>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;

            let mut rows = stmt.query([])?;
            let mut objects = Vec::new();
            while let Some(row) = rows.next()? {
                objects.push(row_to_word_object(row)?);
            }
            Ok(objects)
        })
        .await
    }

    pub async fn get_word_objects_by_word(&self, word: &str) -> Result<Vec<WordObject>> {
        let key = vocabulary_key(word);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE word_key = ?1 ORDER BY id"
            ))?;

            let mut rows = stmt.query(params![key])?;
            let mut objects = Vec::new();
            while let Some(row) = rows.next()? {
                objects.push(row_to_word_object(row)?);
            }
            Ok(objects)
        })
        .await
    }

    /// Stamps every row of the vocabulary entry; returns how many rows changed.
    pub async fn update_last_studied(&self, word: &str, studied_at_ms: i64) -> Result<usize> {
        let key = vocabulary_key(word);
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE word_objects SET last_studied = ?1 WHERE word_key = ?2",
                params![studied_at_ms, key],
            )?;
            Ok(rows_affected)
        })
        .await
    }

    /// Stores the looked-up meaning for a word object.
    pub async fn update_meaning(&self, word_object_id: i64, meaning: &str) -> Result<()> {
        let meaning = meaning.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE word_objects SET meaning = ?1 WHERE id = ?2",
                params![meaning, word_object_id],
            )?;
            expect_one_row(rows_affected, "word object", word_object_id)
        })
        .await
    }

    /// Deletes a word object; its photo goes too once nothing else points at it.
    pub async fn delete_word_object(&self, word_object_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let photo_id: Option<i64> = tx
                .query_row(
                    "SELECT photo_id FROM word_objects WHERE id = ?1",
                    params![word_object_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(photo_id) = photo_id else {
                return expect_one_row(0, "word object", word_object_id);
            };

            tx.execute(
                "DELETE FROM word_objects WHERE id = ?1",
                params![word_object_id],
            )?;
            tx.execute(
                "DELETE FROM photos
                 WHERE id = ?1
                   AND NOT EXISTS (SELECT 1 FROM word_objects WHERE photo_id = ?1)",
                params![photo_id],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, NewExampleSentence, NewPhoto, NewWordObject};

    async fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("vocab.sqlite3")).unwrap();
        (dir, db)
    }

    fn resolved(photo_id: i64, word: &str, meaning: &str) -> NewWordObject {
        NewWordObject {
            photo_id,
            word: word.to_string(),
            meaning: meaning.to_string(),
            bounding_box: Some("0.1,0.1,0.5,0.5".to_string()),
        }
    }

    #[tokio::test]
    async fn lookups_by_word_ignore_case() {
        let (_dir, db) = open().await;
        let first = db.insert_photo(&NewPhoto::local("/a.jpg")).await.unwrap();
        let second = db.insert_photo(&NewPhoto::local("/b.jpg")).await.unwrap();

        db.insert_word_object(&resolved(first.id, "Cat", "고양이"))
            .await
            .unwrap();
        db.insert_word_object(&resolved(second.id, "cat", "고양이"))
            .await
            .unwrap();
        db.insert_word_object(&resolved(second.id, "dog", "개"))
            .await
            .unwrap();

        let cats = db.get_word_objects_by_word("CAT").await.unwrap();
        assert_eq!(cats.len(), 2);
        assert!(cats.iter().all(|o| o.last_studied == 0));
    }

    #[tokio::test]
    async fn matching_folds_unicode_case_and_all_whitespace() {
        let (_dir, db) = open().await;
        let photo = db.insert_photo(&NewPhoto::local("/a.jpg")).await.unwrap();

        db.insert_word_object(&resolved(photo.id, "Éclair", "에클레어"))
            .await
            .unwrap();
        db.insert_word_object(&resolved(photo.id, "cat\t", "고양이"))
            .await
            .unwrap();

        assert_eq!(db.update_last_studied("éclair", 5).await.unwrap(), 1);
        assert_eq!(db.update_last_studied("cat", 5).await.unwrap(), 1);
        assert_eq!(db.get_word_objects_by_word("ÉCLAIR").await.unwrap().len(), 1);
        assert_eq!(db.get_word_objects_by_word(" Cat\n").await.unwrap().len(), 1);

        let all = db.get_all_word_objects().await.unwrap();
        assert!(all.iter().all(|o| o.last_studied == 5));
        // The stored spelling is untouched.
        assert!(all.iter().any(|o| o.word == "cat\t"));
    }

    #[tokio::test]
    async fn update_last_studied_touches_every_sighting() {
        let (_dir, db) = open().await;
        let first = db.insert_photo(&NewPhoto::local("/a.jpg")).await.unwrap();
        let second = db.insert_photo(&NewPhoto::local("/b.jpg")).await.unwrap();

        db.insert_word_object(&resolved(first.id, "cat", "고양이"))
            .await
            .unwrap();
        db.insert_word_object(&resolved(second.id, "Cat", "고양이"))
            .await
            .unwrap();
        let dog = db
            .insert_word_object(&resolved(second.id, "dog", "개"))
            .await
            .unwrap();

        let touched = db.update_last_studied("cat", 1_234).await.unwrap();
        assert_eq!(touched, 2);

        let all = db.get_all_word_objects().await.unwrap();
        for object in all {
            if object.id == dog.id {
                assert_eq!(object.last_studied, 0);
            } else {
                assert_eq!(object.last_studied, 1_234);
            }
        }
    }

    #[tokio::test]
    async fn deleting_photo_cascades() {
        let (_dir, db) = open().await;
        let photo = db.insert_photo(&NewPhoto::local("/a.jpg")).await.unwrap();
        let cat = db
            .insert_word_object(&resolved(photo.id, "cat", "고양이"))
            .await
            .unwrap();
        db.insert_example_sentence(&NewExampleSentence {
            word_object_id: cat.id,
            sentence: "The cat sleeps.".into(),
            translation: "고양이가 잔다.".into(),
        })
        .await
        .unwrap();

        let own = db
            .get_example_sentences_for_word_object(cat.id)
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].sentence, "The cat sleeps.");

        db.delete_photo(photo.id).await.unwrap();

        assert!(db
            .get_example_sentences_for_word_object(cat.id)
            .await
            .unwrap()
            .is_empty());
        assert!(db.get_all_word_objects().await.unwrap().is_empty());
        assert!(db.get_all_example_sentences().await.unwrap().is_empty());
        assert!(db.delete_photo(photo.id).await.is_err());
    }

    #[tokio::test]
    async fn deleting_last_word_object_removes_photo() {
        let (_dir, db) = open().await;
        let photo = db.insert_photo(&NewPhoto::local("/a.jpg")).await.unwrap();
        let cat = db
            .insert_word_object(&resolved(photo.id, "cat", "고양이"))
            .await
            .unwrap();
        let dog = db
            .insert_word_object(&resolved(photo.id, "dog", "개"))
            .await
            .unwrap();

        db.delete_word_object(cat.id).await.unwrap();
        assert!(db.get_photo(photo.id).await.unwrap().is_some());

        db.delete_word_object(dog.id).await.unwrap();
        assert!(db.get_photo(photo.id).await.unwrap().is_none());
        assert!(db.delete_word_object(dog.id).await.is_err());
    }

    #[tokio::test]
    async fn pending_meaning_can_be_resolved() {
        let (_dir, db) = open().await;
        let photo = db.insert_photo(&NewPhoto::local("/a.jpg")).await.unwrap();
        let object = db
            .insert_word_object(&NewWordObject::pending(photo.id, "cup", None))
            .await
            .unwrap();
        assert!(!object.has_resolved_meaning());

        db.update_meaning(object.id, "컵").await.unwrap();

        let stored = db.get_word_objects_by_word("cup").await.unwrap();
        assert_eq!(stored[0].meaning, "컵");
        assert!(stored[0].has_resolved_meaning());
        assert!(db.update_meaning(9_999, "x").await.is_err());
    }

    #[tokio::test]
    async fn remote_placeholder_round_trips() {
        let (_dir, db) = open().await;
        let photo = db
            .insert_photo(&NewPhoto::remote_placeholder())
            .await
            .unwrap();

        let stored = db.get_photo(photo.id).await.unwrap().unwrap();
        assert!(stored.is_remote_placeholder());
        assert_eq!(stored.local_path(), None);
    }
}
