//! Route handlers for the HTTP API and the HTML views.

pub mod chapters;
pub mod health;
pub mod mangas;
pub mod uploads;
pub mod views;
