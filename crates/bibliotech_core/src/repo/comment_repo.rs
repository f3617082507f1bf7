//! Comment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide append/list persistence for per-book comments.
//! - Enforce that comments attach only to existing books.
//!
//! # Invariants
//! - Comments are append-only; no update or delete path exists.
//! - Listing order is newest-first, ties broken by id descending.

use crate::model::book::BookId;
use crate::model::comment::{Comment, NewComment};
use crate::repo::book_repo::{
    ensure_book_connection_ready, table_exists, table_has_column, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    book_id,
    author_name,
    body,
    created_at
FROM comments";

const REQUIRED_COMMENT_COLUMNS: &[&str] = &["id", "book_id", "author_name", "body", "created_at"];

/// Repository interface for per-book comment streams.
pub trait CommentRepository {
    /// Appends a comment to an existing book and returns the stored record.
    fn add_comment(&self, book_id: BookId, comment: &NewComment) -> RepoResult<Comment>;
    /// Returns a book's comments, newest first. A book without comments (or
    /// an unknown id) yields an empty list.
    fn comments_for_book(&self, book_id: BookId) -> RepoResult<Vec<Comment>>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_book_connection_ready(conn)?;
        ensure_comment_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn add_comment(&self, book_id: BookId, comment: &NewComment) -> RepoResult<Comment> {
        if !book_exists(self.conn, book_id)? {
            return Err(RepoError::NotFound(book_id));
        }

        self.conn.execute(
            "INSERT INTO comments (
                book_id,
                author_name,
                body,
                created_at
            ) VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000));",
            params![
                book_id,
                comment.author_name.as_str(),
                comment.body.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => parse_comment_row(row),
            None => Err(RepoError::InvalidData(format!(
                "inserted comment id={id} is not readable back"
            ))),
        }
    }

    fn comments_for_book(&self, book_id: BookId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE book_id = ?1
             ORDER BY created_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query(params![book_id])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }

        Ok(comments)
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        book_id: row.get("book_id")?,
        author_name: row.get("author_name")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
    })
}

fn book_exists(conn: &Connection, book_id: BookId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1);",
        [book_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_comment_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "comments")? {
        return Err(RepoError::MissingRequiredTable("comments"));
    }

    for &column in REQUIRED_COMMENT_COLUMNS {
        if !table_has_column(conn, "comments", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "comments",
                column,
            });
        }
    }

    Ok(())
}
