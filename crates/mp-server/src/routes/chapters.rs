//! Chapter upload and listing route handlers.

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use mp_core::MangaId;

use crate::context::AppContext;
use crate::error::AppError;
use crate::form::FormData;
use crate::service::{self, ChapterListingResponse, ChapterSummary};

/// POST /api/chapters
///
/// Multipart fields: `title`, `manga_id`, and one or more `images`. Pages
/// are numbered in submission order after invalid files are dropped.
#[utoipa::path(
    post,
    path = "/api/chapters",
    responses(
        (status = 303, description = "Chapter stored, redirect to the admin panel"),
        (status = 400, description = "Missing or invalid fields")
    )
)]
pub async fn upload_chapter(
    State(ctx): State<AppContext>,
    form: FormData,
) -> Result<Redirect, AppError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let files = form.files("images");
    service::upload_chapter(
        &conn,
        &ctx.uploads,
        form.text("title"),
        form.text("manga_id"),
        &files,
    )?;
    Ok(Redirect::to("/admin"))
}

/// GET /api/chapters
#[utoipa::path(
    get,
    path = "/api/chapters",
    responses(
        (
            status = 200,
            description = "Every chapter with its manga title and pages",
            body = Vec<ChapterListingResponse>
        )
    )
)]
pub async fn list_chapters(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<ChapterListingResponse>>, AppError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    Ok(Json(service::list_all_chapters(&conn)?))
}

/// GET /api/chapters/:manga_id
#[utoipa::path(
    get,
    path = "/api/chapters/{manga_id}",
    params(("manga_id" = i64, Path, description = "Manga ID")),
    responses(
        (
            status = 200,
            description = "Chapters of the manga, empty when unknown",
            body = Vec<ChapterSummary>
        ),
        (status = 404, description = "Malformed manga ID")
    )
)]
pub async fn list_chapters_for_manga(
    State(ctx): State<AppContext>,
    Path(manga_id): Path<String>,
) -> Result<Json<Vec<ChapterSummary>>, AppError> {
    // A malformed id names no manga.
    let manga_id: MangaId = manga_id
        .parse()
        .map_err(|_| mp_core::Error::not_found("manga", &manga_id))?;

    let conn = mp_db::pool::get_conn(&ctx.db)?;
    Ok(Json(service::list_chapters_for_manga(&conn, manga_id)?))
}
