//! Database query modules.

pub mod chapter_images;
pub mod chapters;
pub mod mangas;
