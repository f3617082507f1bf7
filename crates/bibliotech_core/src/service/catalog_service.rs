//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide stable catalog entry points for callers.
//! - Delegate persistence to injected repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::book::{Book, BookId, NewBook, ReviewPatch};
use crate::model::comment::{Comment, NewComment};
use crate::repo::book_repo::{BookRepository, CatalogQuery, CatalogStats, RepoResult, SortKey};
use crate::repo::comment_repo::CommentRepository;
use log::debug;

/// Use-case service wrapper over the catalog's book and comment stores.
///
/// Owns its injected repositories; callers pass the service around instead
/// of sharing module-level mutable state.
pub struct CatalogService<B: BookRepository, C: CommentRepository> {
    books: B,
    comments: C,
}

impl<B: BookRepository, C: CommentRepository> CatalogService<B, C> {
    /// Creates a service using the provided repository implementations.
    pub fn new(books: B, comments: C) -> Self {
        Self { books, comments }
    }

    /// Adds a book to the catalog and returns the stored record.
    ///
    /// # Contract
    /// - Title and author are required; blank values are rejected.
    /// - The store assigns `id` and stamps `added_at`.
    pub fn add_book(&self, draft: &NewBook) -> RepoResult<Book> {
        let book = self.books.insert_book(draft)?;
        debug!(
            "event=book_added module=service status=ok book_id={}",
            book.id
        );
        Ok(book)
    }

    /// Updates the review fields (rating, opinion) of an existing book.
    ///
    /// Never creates a record: an unknown id is a not-found error.
    pub fn review_book(&self, id: BookId, patch: &ReviewPatch) -> RepoResult<Book> {
        let book = self.books.update_review(id, patch)?;
        debug!(
            "event=review_updated module=service status=ok book_id={id} rating={:?}",
            book.rating
        );
        Ok(book)
    }

    /// Gets one book by stable id.
    pub fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.books.get_book(id)
    }

    /// Lists every book in insertion order.
    pub fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.books.list_books()
    }

    /// Runs a filtered/sorted catalog query.
    pub fn query_books(&self, query: &CatalogQuery) -> RepoResult<Vec<Book>> {
        self.books.query_books(query)
    }

    /// Searches title, author and genre for a case-insensitive substring,
    /// newest additions first.
    pub fn search_books(&self, term: impl Into<String>) -> RepoResult<Vec<Book>> {
        self.books.query_books(&CatalogQuery {
            search: Some(term.into()),
            ..CatalogQuery::default()
        })
    }

    /// Returns the best-rated books, at most `limit` of them.
    pub fn top_rated(&self, limit: u32) -> RepoResult<Vec<Book>> {
        self.books.query_books(&CatalogQuery {
            sort: SortKey::RatingDesc,
            limit: Some(limit),
            ..CatalogQuery::default()
        })
    }

    /// Computes aggregate statistics over the current catalog.
    pub fn stats(&self) -> RepoResult<CatalogStats> {
        self.books.aggregate_stats()
    }

    /// Appends a comment to an existing book.
    pub fn add_comment(&self, book_id: BookId, comment: &NewComment) -> RepoResult<Comment> {
        let stored = self.comments.add_comment(book_id, comment)?;
        debug!(
            "event=comment_added module=service status=ok book_id={book_id} comment_id={}",
            stored.id
        );
        Ok(stored)
    }

    /// Returns a book's comments, newest first.
    pub fn comments_for_book(&self, book_id: BookId) -> RepoResult<Vec<Comment>> {
        self.comments.comments_for_book(book_id)
    }
}
