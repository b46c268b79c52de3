//! Rust structs mapping to database tables.
//!
//! Each table model implements `from_row` for constructing itself from a
//! `rusqlite::Row` whose columns follow the matching `COLS` list in its
//! query module.

use mp_core::{ChapterId, ChapterImageId, MangaId};

// ---------------------------------------------------------------------------
// Manga
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Manga {
    pub id: MangaId,
    pub title: String,
    pub description: Option<String>,
    /// Stored path of the cover image, relative to the upload root.
    pub cover_image_path: Option<String>,
    pub created_at: String,
}

impl Manga {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: MangaId::from(row.get::<_, i64>(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            cover_image_path: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub manga_id: MangaId,
    pub created_at: String,
}

impl Chapter {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: ChapterId::from(row.get::<_, i64>(0)?),
            title: row.get(1)?,
            manga_id: MangaId::from(row.get::<_, i64>(2)?),
            created_at: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ChapterImage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterImage {
    pub id: ChapterImageId,
    /// Sanitized client filename.
    pub filename: String,
    /// Path relative to the upload root.
    pub stored_path: String,
    pub chapter_id: ChapterId,
    /// 1-based position within the chapter.
    pub page_number: i64,
}

impl ChapterImage {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: ChapterImageId::from(row.get::<_, i64>(0)?),
            filename: row.get(1)?,
            stored_path: row.get(2)?,
            chapter_id: ChapterId::from(row.get::<_, i64>(3)?),
            page_number: row.get(4)?,
        })
    }
}

/// An image that has been written to the upload root and is waiting for its
/// row. The page number comes from its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChapterImage {
    pub filename: String,
    pub stored_path: String,
}

// ---------------------------------------------------------------------------
// Composite read models
// ---------------------------------------------------------------------------

/// A chapter together with its images in page order.
#[derive(Debug, Clone)]
pub struct ChapterWithImages {
    pub chapter: Chapter,
    pub images: Vec<ChapterImage>,
}

/// A chapter annotated with its parent manga's title, for cross-manga listings.
#[derive(Debug, Clone)]
pub struct ChapterListing {
    pub chapter: Chapter,
    pub manga_title: String,
    pub images: Vec<ChapterImage>,
}
