//! HTML page handlers.

use axum::extract::{Path, State};
use axum::response::Html;
use mp_core::{ChapterId, MangaId};

use crate::context::AppContext;
use crate::error::PageError;
use crate::render;
use crate::service;

/// GET /
pub async fn index(State(ctx): State<AppContext>) -> Result<Html<String>, PageError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let mangas = service::list_manga_cards(&conn)?;
    Ok(Html(render::index(&mangas)))
}

/// GET /admin
pub async fn admin(State(ctx): State<AppContext>) -> Result<Html<String>, PageError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let mangas = service::list_manga_cards(&conn)?;
    Ok(Html(render::admin(&mangas)))
}

/// GET /manga/:manga_id
pub async fn manga_detail(
    State(ctx): State<AppContext>,
    Path(manga_id): Path<String>,
) -> Result<Html<String>, PageError> {
    // A malformed id names no manga.
    let manga_id: MangaId = manga_id
        .parse()
        .map_err(|_| mp_core::Error::not_found("manga", &manga_id))?;

    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let detail = service::manga_detail(&conn, manga_id)?;
    Ok(Html(render::manga(&detail)))
}

/// GET /read/:chapter_id
pub async fn read_chapter(
    State(ctx): State<AppContext>,
    Path(chapter_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let chapter_id: ChapterId = chapter_id
        .parse()
        .map_err(|_| mp_core::Error::not_found("chapter", &chapter_id))?;

    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let view = service::chapter_reader(&conn, chapter_id)?;
    Ok(Html(render::reader(&view)))
}
