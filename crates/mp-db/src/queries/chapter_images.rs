//! Chapter page image operations.

use mp_core::{ChapterId, ChapterImageId, Error, MangaId, Result};
use rusqlite::Connection;

use crate::models::{ChapterImage, NewChapterImage};

const COLS: &str = "ci.id, ci.filename, ci.stored_path, ci.chapter_id, ci.page_number";

/// Attach a batch of stored images to a chapter.
///
/// Page numbers are `1..=images.len()` in slice order. All rows are written
/// in one transaction; if any insert fails none of them persist. Fails with
/// [`Error::NotFound`] when the chapter does not exist.
pub fn add_chapter_images(
    conn: &Connection,
    chapter_id: ChapterId,
    images: &[NewChapterImage],
) -> Result<Vec<ChapterImage>> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM chapters WHERE id = ?1",
            [chapter_id.get()],
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if !exists {
        return Err(Error::not_found("chapter", chapter_id));
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut created = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let page_number = index as i64 + 1;
        tx.execute(
            "INSERT INTO chapter_images (filename, stored_path, chapter_id, page_number)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![image.filename, image.stored_path, chapter_id.get(), page_number],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        created.push(ChapterImage {
            id: ChapterImageId::from(tx.last_insert_rowid()),
            filename: image.filename.clone(),
            stored_path: image.stored_path.clone(),
            chapter_id,
            page_number,
        });
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(created)
}

/// List a chapter's images in page order.
pub fn list_images_for_chapter(
    conn: &Connection,
    chapter_id: ChapterId,
) -> Result<Vec<ChapterImage>> {
    let q = format!(
        "SELECT {COLS} FROM chapter_images ci
         WHERE ci.chapter_id = ?1
         ORDER BY ci.page_number"
    );
    query_images(conn, &q, [chapter_id.get()])
}

/// List the images of every chapter belonging to a manga, grouped by chapter
/// and in page order within each chapter.
pub fn list_images_for_manga(conn: &Connection, manga_id: MangaId) -> Result<Vec<ChapterImage>> {
    let q = format!(
        "SELECT {COLS} FROM chapter_images ci
         JOIN chapters c ON c.id = ci.chapter_id
         WHERE c.manga_id = ?1
         ORDER BY ci.chapter_id, ci.page_number"
    );
    query_images(conn, &q, [manga_id.get()])
}

/// List every stored image, grouped by chapter and in page order.
pub fn list_all_images(conn: &Connection) -> Result<Vec<ChapterImage>> {
    let q = format!("SELECT {COLS} FROM chapter_images ci ORDER BY ci.chapter_id, ci.page_number");
    query_images(conn, &q, [])
}

fn query_images<P: rusqlite::Params>(
    conn: &Connection,
    q: &str,
    params: P,
) -> Result<Vec<ChapterImage>> {
    let mut stmt = conn.prepare(q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(params, ChapterImage::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
