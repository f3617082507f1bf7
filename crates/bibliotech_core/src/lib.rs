//! Core catalog logic for BiblioTech.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{
    normalize_optional_text, Book, BookId, BookValidationError, NewBook, ReviewPatch, RATING_MAX,
    RATING_MIN, YEAR_MAX, YEAR_MIN,
};
pub use model::comment::{Comment, CommentId, NewComment};
pub use repo::book_repo::{
    BookRepository, CatalogQuery, CatalogStats, RepoError, RepoResult, SortKey,
    SqliteBookRepository,
};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use service::catalog_service::CatalogService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
