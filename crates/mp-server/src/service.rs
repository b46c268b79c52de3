//! Query and presentation service.
//!
//! Sits between route handlers and the storage layer. Read operations
//! project rows into response shapes; write operations validate form input,
//! run uploads through [`UploadStore`], and record the results.

use mp_core::{ChapterId, Error, MangaId, Result};
use mp_db::models::{Chapter, ChapterImage, ChapterListing, Manga, NewChapterImage};
use mp_db::queries::{chapter_images, chapters, mangas};
use rusqlite::Connection;
use serde::Serialize;

use crate::uploads::{UploadStore, UploadedFile};

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Manga entry of `GET /api/mangas`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct MangaSummary {
    #[schema(value_type = i64)]
    pub id: MangaId,
    pub title: String,
}

impl From<&Manga> for MangaSummary {
    fn from(manga: &Manga) -> Self {
        Self {
            id: manga.id,
            title: manga.title.clone(),
        }
    }
}

/// Chapter entry of `GET /api/chapters/{manga_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ChapterSummary {
    #[schema(value_type = i64)]
    pub id: ChapterId,
    pub title: String,
    /// Stored paths in page order.
    pub images: Vec<String>,
}

/// Chapter entry of `GET /api/chapters`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ChapterListingResponse {
    #[schema(value_type = i64)]
    pub id: ChapterId,
    pub title: String,
    /// Title of the parent manga.
    pub manga: String,
    /// Stored paths in page order.
    pub images: Vec<String>,
}

impl From<ChapterListing> for ChapterListingResponse {
    fn from(listing: ChapterListing) -> Self {
        Self {
            id: listing.chapter.id,
            title: listing.chapter.title,
            manga: listing.manga_title,
            images: stored_paths(&listing.images),
        }
    }
}

/// Result of `POST /api/add_manga`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MangaCreated {
    pub message: String,
    #[schema(value_type = i64)]
    pub id: MangaId,
}

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// A manga as shown on the index page.
#[derive(Debug, Clone)]
pub struct MangaCard {
    pub id: MangaId,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
}

impl From<&Manga> for MangaCard {
    fn from(manga: &Manga) -> Self {
        Self {
            id: manga.id,
            title: manga.title.clone(),
            description: manga.description.clone(),
            cover_url: manga.cover_image_path.as_deref().map(UploadStore::public_url),
        }
    }
}

/// A manga with its chapters, for the detail page.
#[derive(Debug, Clone)]
pub struct MangaDetail {
    pub manga: MangaCard,
    pub chapters: Vec<ChapterSummary>,
}

/// One chapter with its page URLs, for the reader page.
#[derive(Debug, Clone)]
pub struct ChapterReader {
    pub chapter: Chapter,
    pub manga: MangaCard,
    /// Public page URLs in page order.
    pub pages: Vec<String>,
}

fn stored_paths(images: &[ChapterImage]) -> Vec<String> {
    images.iter().map(|i| i.stored_path.clone()).collect()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub fn list_mangas(conn: &Connection) -> Result<Vec<MangaSummary>> {
    Ok(mangas::list_mangas(conn)?.iter().map(MangaSummary::from).collect())
}

pub fn list_manga_cards(conn: &Connection) -> Result<Vec<MangaCard>> {
    Ok(mangas::list_mangas(conn)?.iter().map(MangaCard::from).collect())
}

pub fn list_all_chapters(conn: &Connection) -> Result<Vec<ChapterListingResponse>> {
    Ok(chapters::list_all_chapters(conn)?
        .into_iter()
        .map(ChapterListingResponse::from)
        .collect())
}

/// Chapters of one manga. An unknown manga yields an empty list.
pub fn list_chapters_for_manga(
    conn: &Connection,
    manga_id: MangaId,
) -> Result<Vec<ChapterSummary>> {
    Ok(chapters::list_chapters_for_manga(conn, manga_id)?
        .into_iter()
        .map(|c| ChapterSummary {
            id: c.chapter.id,
            title: c.chapter.title,
            images: stored_paths(&c.images),
        })
        .collect())
}

pub fn manga_detail(conn: &Connection, manga_id: MangaId) -> Result<MangaDetail> {
    let manga =
        mangas::get_manga(conn, manga_id)?.ok_or_else(|| Error::not_found("manga", manga_id))?;
    Ok(MangaDetail {
        manga: MangaCard::from(&manga),
        chapters: list_chapters_for_manga(conn, manga_id)?,
    })
}

pub fn chapter_reader(conn: &Connection, chapter_id: ChapterId) -> Result<ChapterReader> {
    let chapter = chapters::get_chapter(conn, chapter_id)?
        .ok_or_else(|| Error::not_found("chapter", chapter_id))?;
    let manga = mangas::get_manga(conn, chapter.manga_id)?
        .ok_or_else(|| Error::not_found("manga", chapter.manga_id))?;
    let pages = chapter_images::list_images_for_chapter(conn, chapter_id)?
        .iter()
        .map(|i| UploadStore::public_url(&i.stored_path))
        .collect();

    Ok(ChapterReader {
        chapter,
        manga: MangaCard::from(&manga),
        pages,
    })
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Create a manga without a cover.
pub fn create_manga(
    conn: &Connection,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Manga> {
    let title = title.ok_or_else(|| Error::Validation("title is required".into()))?;
    mangas::create_manga(conn, title, description, None)
}

/// Create a manga from the admin form.
///
/// Returns `Ok(None)` without creating anything when the title or cover is
/// missing or the cover is rejected by the upload store.
pub fn create_manga_with_cover(
    conn: &Connection,
    uploads: &UploadStore,
    title: Option<&str>,
    description: Option<&str>,
    cover: Option<&UploadedFile>,
) -> Result<Option<Manga>> {
    let (Some(title), Some(cover)) = (title, cover) else {
        tracing::debug!("Ignoring manga form without title or cover");
        return Ok(None);
    };
    let Some(stored) = uploads.store(cover) else {
        return Ok(None);
    };

    let manga = mangas::create_manga(conn, title, description, Some(&stored.stored_path))?;
    tracing::info!(manga_id = %manga.id, title = %manga.title, "Manga created");
    Ok(Some(manga))
}

/// Create a chapter and attach the valid images of the batch as its pages.
///
/// The chapter row is committed before any file is written; the image rows
/// are then inserted in a single transaction. Invalid files are skipped and
/// do not consume a page number.
pub fn upload_chapter(
    conn: &Connection,
    uploads: &UploadStore,
    title: Option<&str>,
    manga_id: Option<&str>,
    files: &[UploadedFile],
) -> Result<(Chapter, Vec<ChapterImage>)> {
    let (Some(title), Some(manga_id)) = (title, manga_id) else {
        return Err(Error::Validation("Missing required fields".into()));
    };
    if files.is_empty() {
        return Err(Error::Validation("Missing required fields".into()));
    }
    let manga_id: MangaId = manga_id
        .parse()
        .map_err(|_| Error::Validation(format!("invalid manga_id {manga_id:?}")))?;

    let chapter = chapters::create_chapter(conn, title, manga_id)?;

    let stored: Vec<NewChapterImage> = uploads
        .store_batch(files)
        .into_iter()
        .map(NewChapterImage::from)
        .collect();
    let images = chapter_images::add_chapter_images(conn, chapter.id, &stored)?;

    tracing::info!(
        chapter_id = %chapter.id,
        manga_id = %manga_id,
        pages = images.len(),
        skipped = files.len() - images.len(),
        "Chapter uploaded"
    );
    Ok((chapter, images))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_db::pool::init_memory_pool;

    fn store() -> (tempfile::TempDir, UploadStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), true);
        (dir, store)
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile::new(name, name.as_bytes().to_vec())
    }

    #[test]
    fn lists_mangas_as_summaries() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_manga(&conn, Some("One Piece"), None).unwrap();
        create_manga(&conn, Some("Naruto"), Some("ninja")).unwrap();

        let titles: Vec<String> =
            list_mangas(&conn).unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["One Piece", "Naruto"]);
    }

    #[test]
    fn create_manga_requires_title() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        assert!(matches!(create_manga(&conn, None, None), Err(Error::Validation(_))));
    }

    #[test]
    fn cover_form_skips_silently() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (_dir, uploads) = store();

        let none = create_manga_with_cover(&conn, &uploads, Some("X"), None, None).unwrap();
        assert!(none.is_none());
        let bad =
            create_manga_with_cover(&conn, &uploads, Some("X"), None, Some(&file("c.exe")))
                .unwrap();
        assert!(bad.is_none());
        assert!(list_mangas(&conn).unwrap().is_empty());

        let cover = file("c.png");
        let manga = create_manga_with_cover(&conn, &uploads, Some("X"), Some("d"), Some(&cover))
            .unwrap()
            .unwrap();
        assert_eq!(manga.cover_image_path.as_deref(), Some("c.png"));
    }

    #[test]
    fn upload_numbers_valid_pages_only() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (dir, uploads) = store();
        let manga = create_manga(&conn, Some("One Piece"), None).unwrap();
        let manga_id = manga.id.to_string();

        let files = [file("a.jpg"), file("b.txt"), file("c.png")];
        let (chapter, images) =
            upload_chapter(&conn, &uploads, Some("Ch1"), Some(&manga_id), &files).unwrap();

        let pages: Vec<(i64, &str)> = images
            .iter()
            .map(|i| (i.page_number, i.stored_path.as_str()))
            .collect();
        assert_eq!(pages, vec![(1, "a.jpg"), (2, "c.png")]);
        assert!(dir.path().join("a.jpg").exists());
        assert!(!dir.path().join("b.txt").exists());

        let listed = list_chapters_for_manga(&conn, manga.id).unwrap();
        assert_eq!(
            listed,
            vec![ChapterSummary {
                id: chapter.id,
                title: "Ch1".into(),
                images: vec!["a.jpg".into(), "c.png".into()],
            }]
        );
    }

    #[test]
    fn upload_rejects_missing_fields_before_writing() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (dir, uploads) = store();
        create_manga(&conn, Some("One Piece"), None).unwrap();

        let files = [file("a.jpg")];
        for (title, manga_id, files) in [
            (Some("Ch1"), None, &files[..]),
            (None, Some("1"), &files[..]),
            (Some("Ch1"), Some("1"), &[][..]),
            (Some("Ch1"), Some("one"), &files[..]),
        ] {
            let err = upload_chapter(&conn, &uploads, title, manga_id, files).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert!(list_all_chapters(&conn).unwrap().is_empty());
        assert!(!dir.path().join("a.jpg").exists());
    }

    #[test]
    fn all_invalid_batch_keeps_empty_chapter() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (_dir, uploads) = store();
        create_manga(&conn, Some("One Piece"), None).unwrap();

        let (_, images) =
            upload_chapter(&conn, &uploads, Some("Ch1"), Some("1"), &[file("notes.txt")]).unwrap();
        assert!(images.is_empty());

        let all = list_all_chapters(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].manga, "One Piece");
        assert!(all[0].images.is_empty());
    }

    #[test]
    fn detail_and_reader_views() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let (_dir, uploads) = store();
        let manga = create_manga(&conn, Some("One Piece"), None).unwrap();
        let pages = [file("p1.png"), file("p2.png")];
        let (chapter, _) = upload_chapter(&conn, &uploads, Some("Ch1"), Some("1"), &pages).unwrap();

        let detail = manga_detail(&conn, manga.id).unwrap();
        assert_eq!(detail.manga.title, "One Piece");
        assert_eq!(detail.chapters.len(), 1);

        let reader = chapter_reader(&conn, chapter.id).unwrap();
        assert_eq!(reader.manga.id, manga.id);
        assert_eq!(reader.pages, vec!["/uploads/p1.png", "/uploads/p2.png"]);

        assert!(matches!(
            manga_detail(&conn, MangaId::from(999)),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            chapter_reader(&conn, ChapterId::from(999)),
            Err(Error::NotFound { .. })
        ));
    }
}
