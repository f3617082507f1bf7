//! Comment domain model.
//!
//! Comments are append-only: once attached to a book they are never mutated
//! or deleted.

use crate::model::book::BookId;
use serde::{Deserialize, Serialize};

/// Stable identifier assigned by the store when a comment is appended.
pub type CommentId = i64;

/// One reader comment attached to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Owning book. Many comments map to one book.
    pub book_id: BookId,
    pub author_name: String,
    pub body: String,
    /// Append timestamp in epoch milliseconds. Immutable.
    pub created_at: i64,
}

/// Append input for [`Comment`]. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub author_name: String,
    pub body: String,
}

impl NewComment {
    pub fn new(author_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            body: body.into(),
        }
    }
}
