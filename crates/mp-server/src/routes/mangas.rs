//! Manga route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;

use crate::context::AppContext;
use crate::error::AppError;
use crate::form::FormData;
use crate::service::{self, MangaCreated, MangaSummary};

/// GET /api/mangas
#[utoipa::path(
    get,
    path = "/api/mangas",
    responses(
        (status = 200, description = "All mangas in creation order", body = Vec<MangaSummary>)
    )
)]
pub async fn list_mangas(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<MangaSummary>>, AppError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    Ok(Json(service::list_mangas(&conn)?))
}

/// POST /api/add_manga
///
/// Accepts `title` and optional `description` as urlencoded or multipart
/// form fields.
#[utoipa::path(
    post,
    path = "/api/add_manga",
    responses(
        (status = 201, description = "Manga created", body = MangaCreated),
        (status = 400, description = "Title missing")
    )
)]
pub async fn add_manga(
    State(ctx): State<AppContext>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let manga = service::create_manga(&conn, form.text("title"), form.text("description"))?;
    tracing::info!(manga_id = %manga.id, title = %manga.title, "Manga created");

    Ok((
        StatusCode::CREATED,
        Json(MangaCreated {
            message: "Manga added".into(),
            id: manga.id,
        }),
    ))
}

/// POST /add_manga
///
/// Admin form submission with a cover image. Always redirects back to the
/// admin panel; incomplete submissions create nothing.
pub async fn add_manga_form(
    State(ctx): State<AppContext>,
    form: FormData,
) -> Result<Redirect, AppError> {
    let conn = mp_db::pool::get_conn(&ctx.db)?;
    let cover = form.file("cover_image");
    service::create_manga_with_cover(
        &conn,
        &ctx.uploads,
        form.text("title"),
        form.text("description"),
        cover.as_ref(),
    )?;
    Ok(Redirect::to("/admin"))
}
