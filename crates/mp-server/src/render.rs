//! Server-rendered HTML pages.
//!
//! Markup is built with maud, which escapes every interpolated value.

use axum::http::StatusCode;
use maud::{html, Markup, DOCTYPE};

use crate::service::{ChapterReader, MangaCard, MangaDetail};

const STYLE: &str = "
body { font-family: sans-serif; margin: 0 auto; max-width: 960px; padding: 1rem; }
header a { text-decoration: none; color: inherit; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 1rem; }
.card img { width: 100%; aspect-ratio: 2 / 3; object-fit: cover; }
.pages img { display: block; width: 100%; margin: 0 auto 0.5rem; }
form { display: grid; gap: 0.5rem; max-width: 420px; margin-bottom: 2rem; }
";

fn layout(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Mangapress" }
                style { (STYLE) }
            }
            body {
                header {
                    h1 { a href="/" { "Mangapress" } }
                    nav { a href="/" { "Library" } " | " a href="/admin" { "Admin" } }
                }
                main { (body) }
            }
        }
    }
    .into_string()
}

fn cover(manga: &MangaCard) -> Markup {
    html! {
        @if let Some(url) = &manga.cover_url {
            img src=(url) alt=(manga.title);
        }
    }
}

/// Library index: every manga with its cover.
pub fn index(mangas: &[MangaCard]) -> String {
    layout(
        "Library",
        html! {
            @if mangas.is_empty() {
                p { "No manga yet. Add one from the " a href="/admin" { "admin panel" } "." }
            } @else {
                div.grid {
                    @for manga in mangas {
                        a.card href={ "/manga/" (manga.id.get()) } {
                            (cover(manga))
                            h3 { (manga.title) }
                        }
                    }
                }
            }
        },
    )
}

/// Admin panel with the manga and chapter upload forms.
pub fn admin(mangas: &[MangaCard]) -> String {
    layout(
        "Admin",
        html! {
            h2 { "Add manga" }
            form method="post" action="/add_manga" enctype="multipart/form-data" {
                input type="text" name="title" placeholder="Title" required;
                textarea name="description" placeholder="Description" {}
                input type="file" name="cover_image" accept="image/*" required;
                button type="submit" { "Add manga" }
            }

            h2 { "Upload chapter" }
            @if mangas.is_empty() {
                p { "Add a manga before uploading chapters." }
            } @else {
                form method="post" action="/api/chapters" enctype="multipart/form-data" {
                    input type="text" name="title" placeholder="Chapter title" required;
                    select name="manga_id" required {
                        @for manga in mangas {
                            option value=(manga.id.get()) { (manga.title) }
                        }
                    }
                    input type="file" name="images" accept="image/*" multiple required;
                    button type="submit" { "Upload chapter" }
                }
            }
        },
    )
}

/// Manga detail page listing its chapters.
pub fn manga(detail: &MangaDetail) -> String {
    let manga = &detail.manga;
    layout(
        &manga.title,
        html! {
            h2 { (manga.title) }
            (cover(manga))
            @if let Some(description) = &manga.description {
                p { (description) }
            }
            h3 { "Chapters" }
            @if detail.chapters.is_empty() {
                p { "No chapters yet." }
            } @else {
                ol {
                    @for chapter in &detail.chapters {
                        li {
                            a href={ "/read/" (chapter.id.get()) } { (chapter.title) }
                            " (" (chapter.images.len()) " pages)"
                        }
                    }
                }
            }
        },
    )
}

/// Chapter reader showing every page in order.
pub fn reader(view: &ChapterReader) -> String {
    layout(
        &format!("{} · {}", view.chapter.title, view.manga.title),
        html! {
            h2 {
                a href={ "/manga/" (view.manga.id.get()) } { (view.manga.title) }
                " / " (view.chapter.title)
            }
            div.pages {
                @for (index, url) in view.pages.iter().enumerate() {
                    img src=(url) alt={ "Page " (index + 1) } loading="lazy";
                }
            }
            @if view.pages.is_empty() {
                p { "This chapter has no pages." }
            }
        },
    )
}

/// Error page for a failed view.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    layout(
        reason,
        html! {
            h2 { (status.as_u16()) " " (reason) }
            p { (message) }
            p { a href="/" { "Back to the library" } }
        },
    )
}
