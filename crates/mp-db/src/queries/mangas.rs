//! Manga CRUD operations.

use chrono::Utc;
use mp_core::{Error, MangaId, Result};
use rusqlite::Connection;

use crate::models::Manga;

const COLS: &str = "id, title, description, cover_image_path, created_at";

/// Create a new manga.
///
/// The title is trimmed and must not be empty. Empty descriptions are
/// stored as `NULL`.
pub fn create_manga(
    conn: &Connection,
    title: &str,
    description: Option<&str>,
    cover_image_path: Option<&str>,
) -> Result<Manga> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Validation("title is required".into()));
    }
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    let created_at = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO mangas (title, description, cover_image_path, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![title, description, cover_image_path, created_at],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Manga {
        id: MangaId::from(conn.last_insert_rowid()),
        title: title.to_string(),
        description: description.map(String::from),
        cover_image_path: cover_image_path.map(String::from),
        created_at,
    })
}

/// Get a manga by ID.
pub fn get_manga(conn: &Connection, id: MangaId) -> Result<Option<Manga>> {
    let q = format!("SELECT {COLS} FROM mangas WHERE id = ?1");
    let result = conn.query_row(&q, [id.get()], Manga::from_row);
    match result {
        Ok(m) => Ok(Some(m)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all mangas in creation (id) order.
pub fn list_mangas(conn: &Connection) -> Result<Vec<Manga>> {
    let q = format!("SELECT {COLS} FROM mangas ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Manga::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Delete a manga (cascades to chapters and their images).
pub fn delete_manga(conn: &Connection, id: MangaId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM mangas WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
