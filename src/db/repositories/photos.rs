use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{expect_one_row, parse_datetime},
    models::{NewPhoto, Photo},
};

fn row_to_photo(row: &Row) -> Result<Photo> {
    let created_at: String = row.get("created_at")?;

    Ok(Photo {
        id: row.get("id")?,
        file_path: row.get("file_path")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        let record = photo.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO photos (file_path, created_at) VALUES (?1, ?2)",
                params![record.file_path, record.created_at.to_rfc3339()],
            )?;

            Ok(Photo {
                id: conn.last_insert_rowid(),
                file_path: record.file_path,
                created_at: record.created_at,
            })
        })
        .await
    }

    pub async fn get_photo(&self, photo_id: i64) -> Result<Option<Photo>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, file_path, created_at FROM photos WHERE id = ?1",
            )?;
            let photo = stmt
                .query_row(params![photo_id], |row| Ok(row_to_photo(row)))
                .optional()?
                .transpose()?;
            Ok(photo)
        })
        .await
    }

    pub async fn get_all_photos(&self) -> Result<Vec<Photo>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, file_path, created_at FROM photos ORDER BY created_at DESC, id DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut photos = Vec::new();
            while let Some(row) = rows.next()? {
                photos.push(row_to_photo(row)?);
            }
            Ok(photos)
        })
        .await
    }

    /// Deletes a photo together with its word objects and their sentences.
    pub async fn delete_photo(&self, photo_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected =
                conn.execute("DELETE FROM photos WHERE id = ?1", params![photo_id])?;
            expect_one_row(rows_affected, "photo", photo_id)
        })
        .await
    }
}
