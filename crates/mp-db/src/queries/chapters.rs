//! Chapter CRUD operations and chapter listings with their page images.

use std::collections::HashMap;

use chrono::Utc;
use mp_core::{ChapterId, Error, MangaId, Result};
use rusqlite::Connection;

use crate::models::{Chapter, ChapterImage, ChapterListing, ChapterWithImages};
use crate::queries::{chapter_images, mangas};

const COLS: &str = "c.id, c.title, c.manga_id, c.created_at";

/// Create a new chapter under an existing manga.
///
/// Fails with [`Error::Validation`] when the title is empty or `manga_id`
/// does not reference an existing manga.
pub fn create_chapter(conn: &Connection, title: &str, manga_id: MangaId) -> Result<Chapter> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Validation("title is required".into()));
    }
    if mangas::get_manga(conn, manga_id)?.is_none() {
        return Err(Error::Validation(format!(
            "manga_id {manga_id} does not reference an existing manga"
        )));
    }

    let created_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO chapters (title, manga_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![title, manga_id.get(), created_at],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Chapter {
        id: ChapterId::from(conn.last_insert_rowid()),
        title: title.to_string(),
        manga_id,
        created_at,
    })
}

/// Get a chapter by ID.
pub fn get_chapter(conn: &Connection, id: ChapterId) -> Result<Option<Chapter>> {
    let q = format!("SELECT {COLS} FROM chapters c WHERE c.id = ?1");
    let result = conn.query_row(&q, [id.get()], Chapter::from_row);
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List a manga's chapters in id order, each with its images in page order.
///
/// An unknown manga yields an empty list rather than an error.
pub fn list_chapters_for_manga(
    conn: &Connection,
    manga_id: MangaId,
) -> Result<Vec<ChapterWithImages>> {
    let q = format!("SELECT {COLS} FROM chapters c WHERE c.manga_id = ?1 ORDER BY c.id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let chapters = stmt
        .query_map([manga_id.get()], Chapter::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut images = group_by_chapter(chapter_images::list_images_for_manga(conn, manga_id)?);

    Ok(chapters
        .into_iter()
        .map(|chapter| ChapterWithImages {
            images: images.remove(&chapter.id).unwrap_or_default(),
            chapter,
        })
        .collect())
}

/// List every chapter in id order, annotated with its manga's title.
pub fn list_all_chapters(conn: &Connection) -> Result<Vec<ChapterListing>> {
    let q = format!(
        "SELECT {COLS}, m.title FROM chapters c
         JOIN mangas m ON m.id = c.manga_id
         ORDER BY c.id"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((Chapter::from_row(row)?, row.get::<_, String>(4)?)))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut images = group_by_chapter(chapter_images::list_all_images(conn)?);

    Ok(rows
        .into_iter()
        .map(|(chapter, manga_title)| ChapterListing {
            images: images.remove(&chapter.id).unwrap_or_default(),
            chapter,
            manga_title,
        })
        .collect())
}

/// Delete a chapter (cascades to its images).
pub fn delete_chapter(conn: &Connection, id: ChapterId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM chapters WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Bucket page-ordered images by chapter, preserving their order.
fn group_by_chapter(images: Vec<ChapterImage>) -> HashMap<ChapterId, Vec<ChapterImage>> {
    let mut grouped: HashMap<ChapterId, Vec<ChapterImage>> = HashMap::new();
    for image in images {
        grouped.entry(image.chapter_id).or_default().push(image);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewChapterImage;
    use crate::pool::init_memory_pool;
    use crate::queries::chapter_images::{add_chapter_images, list_images_for_chapter};

    fn images(names: &[&str]) -> Vec<NewChapterImage> {
        names
            .iter()
            .map(|n| NewChapterImage {
                filename: n.to_string(),
                stored_path: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let manga = mangas::create_manga(&conn, "One Piece", None, None).unwrap();

        let chapter = create_chapter(&conn, "Romance Dawn", manga.id).unwrap();
        assert_eq!(chapter.manga_id, manga.id);

        let found = get_chapter(&conn, chapter.id).unwrap().unwrap();
        assert_eq!(found, chapter);
        assert!(get_chapter(&conn, ChapterId::from(999)).unwrap().is_none());
    }

    #[test]
    fn unknown_manga_is_validation_error() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let err = create_chapter(&conn, "Ch1", MangaId::from(42)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chapters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn empty_title_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let manga = mangas::create_manga(&conn, "One Piece", None, None).unwrap();

        let err = create_chapter(&conn, "", manga.id).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn chapters_listed_under_their_manga() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let one_piece = mangas::create_manga(&conn, "One Piece", None, None).unwrap();
        let naruto = mangas::create_manga(&conn, "Naruto", None, None).unwrap();

        let ch1 = create_chapter(&conn, "Ch1", one_piece.id).unwrap();
        let ch2 = create_chapter(&conn, "Ch2", one_piece.id).unwrap();
        create_chapter(&conn, "Uzumaki", naruto.id).unwrap();
        add_chapter_images(&conn, ch1.id, &images(&["a.jpg", "c.png"])).unwrap();

        let listed = list_chapters_for_manga(&conn, one_piece.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].chapter.id, ch1.id);
        assert_eq!(listed[1].chapter.id, ch2.id);
        assert!(listed.iter().all(|c| c.chapter.manga_id == one_piece.id));

        let pages: Vec<(i64, &str)> = listed[0]
            .images
            .iter()
            .map(|i| (i.page_number, i.stored_path.as_str()))
            .collect();
        assert_eq!(pages, vec![(1, "a.jpg"), (2, "c.png")]);
        assert!(listed[1].images.is_empty());
    }

    #[test]
    fn unknown_manga_lists_nothing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(list_chapters_for_manga(&conn, MangaId::from(999)).unwrap().is_empty());
    }

    #[test]
    fn all_chapters_carry_manga_title() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let one_piece = mangas::create_manga(&conn, "One Piece", None, None).unwrap();
        let naruto = mangas::create_manga(&conn, "Naruto", None, None).unwrap();
        let ch = create_chapter(&conn, "Ch1", one_piece.id).unwrap();
        create_chapter(&conn, "Ch1", naruto.id).unwrap();
        add_chapter_images(&conn, ch.id, &images(&["p1.png", "p2.png"])).unwrap();

        let all = list_all_chapters(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].manga_title, "One Piece");
        assert_eq!(all[0].images.len(), 2);
        assert_eq!(all[1].manga_title, "Naruto");
        assert!(all[1].images.is_empty());
    }

    #[test]
    fn deleting_manga_cascades() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let manga = mangas::create_manga(&conn, "One Piece", None, None).unwrap();
        let ch1 = create_chapter(&conn, "Ch1", manga.id).unwrap();
        let ch2 = create_chapter(&conn, "Ch2", manga.id).unwrap();
        add_chapter_images(&conn, ch1.id, &images(&["a.png", "b.png"])).unwrap();
        add_chapter_images(&conn, ch2.id, &images(&["c.png"])).unwrap();

        assert!(mangas::delete_manga(&conn, manga.id).unwrap());

        assert!(list_chapters_for_manga(&conn, manga.id).unwrap().is_empty());
        assert!(list_all_chapters(&conn).unwrap().is_empty());
        assert!(list_images_for_chapter(&conn, ch1.id).unwrap().is_empty());
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM chapter_images", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn deleting_chapter_cascades_to_images_only() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let manga = mangas::create_manga(&conn, "One Piece", None, None).unwrap();
        let ch1 = create_chapter(&conn, "Ch1", manga.id).unwrap();
        let ch2 = create_chapter(&conn, "Ch2", manga.id).unwrap();
        add_chapter_images(&conn, ch1.id, &images(&["a.png"])).unwrap();
        add_chapter_images(&conn, ch2.id, &images(&["b.png"])).unwrap();

        assert!(delete_chapter(&conn, ch1.id).unwrap());
        assert!(!delete_chapter(&conn, ch1.id).unwrap());

        assert!(list_images_for_chapter(&conn, ch1.id).unwrap().is_empty());
        assert_eq!(list_images_for_chapter(&conn, ch2.id).unwrap().len(), 1);
        assert!(mangas::get_manga(&conn, manga.id).unwrap().is_some());
    }
}
