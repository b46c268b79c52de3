//! Axum router construction.
//!
//! Builds the full application router: JSON API, form endpoints, upload
//! serving, HTML views, and the Swagger UI.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::mangas::list_mangas,
        routes::mangas::add_manga,
        routes::chapters::upload_chapter,
        routes::chapters::list_chapters,
        routes::chapters::list_chapters_for_manga,
    ),
    components(schemas(
        crate::service::MangaSummary,
        crate::service::MangaCreated,
        crate::service::ChapterSummary,
        crate::service::ChapterListingResponse,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = ctx.config.uploads.max_body_bytes;

    let api = Router::new()
        .route("/mangas", get(routes::mangas::list_mangas))
        .route("/add_manga", post(routes::mangas::add_manga))
        .route(
            "/chapters",
            get(routes::chapters::list_chapters).post(routes::chapters::upload_chapter),
        )
        .route(
            "/chapters/{manga_id}",
            get(routes::chapters::list_chapters_for_manga),
        );

    let views = Router::new()
        .route("/", get(routes::views::index))
        .route("/admin", get(routes::views::admin))
        .route("/manga/{manga_id}", get(routes::views::manga_detail))
        .route("/read/{chapter_id}", get(routes::views::read_chapter))
        .route("/add_manga", post(routes::mangas::add_manga_form));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(views)
        .route("/uploads/{filename}", get(routes::uploads::serve_upload))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
