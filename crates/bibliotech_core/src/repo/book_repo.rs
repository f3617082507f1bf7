//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable insert/update/query APIs over `books` storage.
//! - Keep SQL details inside the catalog persistence boundary.
//!
//! # Invariants
//! - Write paths validate model input before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Only `rating` and `opinion` are mutable after insert.

use crate::db::DbError;
use crate::model::book::{
    normalize_optional_text, Book, BookId, BookValidationError, NewBook, ReviewPatch, RATING_MAX,
    RATING_MIN,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    genre,
    year,
    rating,
    opinion,
    cover_url,
    added_at
FROM books";

const REQUIRED_BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "genre",
    "year",
    "rating",
    "opinion",
    "cover_url",
    "added_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Storage(DbError),
    NotFound(BookId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Sort criterion for catalog queries. Exactly one key is active at a time;
/// ties are broken by insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest additions first. Default.
    #[default]
    AddedDesc,
    /// Best rated first; unrated books sort last.
    RatingDesc,
    /// Title A-Z, case-insensitive (COLLATE NOCASE).
    TitleAsc,
    /// Author A-Z, case-insensitive (COLLATE NOCASE).
    AuthorAsc,
    /// Most recent publication year first; unknown years sort last.
    YearDesc,
}

/// Filter, sort and pagination options for catalog queries.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Keep only books whose genre is in this set. Empty set = no filtering.
    pub genres: Vec<String>,
    /// Keep only books with a present rating >= threshold. A threshold of 0
    /// filters nothing; unrated books are excluded for any threshold > 0.
    pub min_rating: Option<f64>,
    /// Case-insensitive substring match against title, author or genre.
    pub search: Option<String>,
    pub sort: SortKey,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Derived summary over the current catalog. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct CatalogStats {
    pub book_count: u64,
    /// Arithmetic mean over books with a present rating; 0 when none has one.
    pub mean_rating: f64,
    /// Books whose opinion text is non-empty.
    pub reviewed_count: u64,
    /// Distinct non-empty genre values.
    pub distinct_genre_count: u64,
    /// Total comments across all books.
    pub comment_count: u64,
}

/// Repository interface for book catalog operations.
pub trait BookRepository {
    /// Persists a new book and returns the fully populated stored record.
    fn insert_book(&self, draft: &NewBook) -> RepoResult<Book>;
    /// Applies a review patch to an existing book and returns the updated
    /// record. Idempotent: reapplying the same patch changes nothing.
    fn update_review(&self, id: BookId, patch: &ReviewPatch) -> RepoResult<Book>;
    /// Point read by stable id.
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Every book in insertion order.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Filtered/sorted/paginated scan.
    fn query_books(&self, query: &CatalogQuery) -> RepoResult<Vec<Book>>;
    /// Aggregate statistics over the current record set.
    fn aggregate_stats(&self) -> RepoResult<CatalogStats>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Rejects connections whose schema version or table shape does not
    /// match what this binary expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_book_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert_book(&self, draft: &NewBook) -> RepoResult<Book> {
        let draft = draft.normalized();
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO books (
                title,
                author,
                genre,
                year,
                rating,
                opinion,
                cover_url,
                added_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, (strftime('%s', 'now') * 1000));",
            params![
                draft.title.as_str(),
                draft.author.as_str(),
                draft.genre.as_deref(),
                draft.year,
                draft.rating,
                draft.opinion.as_deref(),
                draft.cover_url.as_deref(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_book(id)?.ok_or(RepoError::NotFound(id))
    }

    fn update_review(&self, id: BookId, patch: &ReviewPatch) -> RepoResult<Book> {
        patch.validate()?;

        if patch.is_empty() {
            return self.get_book(id)?.ok_or(RepoError::NotFound(id));
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(rating) = patch.rating {
            assignments.push("rating = ?");
            bind_values.push(Value::Real(rating));
        }
        if let Some(opinion) = patch.opinion.as_deref() {
            assignments.push("opinion = ?");
            bind_values.push(match normalize_optional_text(Some(opinion)) {
                Some(text) => Value::Text(text),
                None => Value::Null,
            });
        }

        let sql = format!("UPDATE books SET {} WHERE id = ?;", assignments.join(", "));
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_book(id)?.ok_or(RepoError::NotFound(id))
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }

        Ok(None)
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn query_books(&self, query: &CatalogQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.genres.is_empty() {
            let placeholders = vec!["?"; query.genres.len()].join(", ");
            sql.push_str(&format!(" AND genre IN ({placeholders})"));
            for genre in &query.genres {
                bind_values.push(Value::Text(genre.clone()));
            }
        }

        if let Some(min_rating) = query.min_rating {
            // Threshold 0 keeps unrated books visible; any positive threshold
            // requires a present rating.
            if min_rating > 0.0 {
                sql.push_str(" AND rating IS NOT NULL AND rating >= ?");
                bind_values.push(Value::Real(min_rating));
            }
        }

        if let Some(term) = query.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                let pattern = format!("%{}%", escape_like_term(term));
                sql.push_str(
                    " AND (title LIKE ? ESCAPE '\\'
                       OR author LIKE ? ESCAPE '\\'
                       OR genre LIKE ? ESCAPE '\\')",
                );
                for _ in 0..3 {
                    bind_values.push(Value::Text(pattern.clone()));
                }
            }
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(order_clause(query.sort));

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn aggregate_stats(&self) -> RepoResult<CatalogStats> {
        let book_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;

        // AVG ignores NULL ratings; an all-NULL (or empty) catalog yields
        // NULL, reported as 0 to avoid a division-by-zero equivalent.
        let mean_rating: Option<f64> =
            self.conn
                .query_row("SELECT AVG(rating) FROM books;", [], |row| row.get(0))?;

        let reviewed_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM books WHERE opinion IS NOT NULL AND TRIM(opinion) <> '';",
            [],
            |row| row.get(0),
        )?;

        let distinct_genre_count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT genre) FROM books WHERE genre IS NOT NULL AND TRIM(genre) <> '';",
            [],
            |row| row.get(0),
        )?;

        let comment_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))?;

        Ok(CatalogStats {
            book_count: book_count as u64,
            mean_rating: mean_rating.unwrap_or(0.0),
            reviewed_count: reviewed_count as u64,
            distinct_genre_count: distinct_genre_count as u64,
            comment_count: comment_count as u64,
        })
    }
}

fn order_clause(sort: SortKey) -> &'static str {
    // SQLite sorts NULL last under DESC, which keeps unrated/undated books at
    // the tail for rating/year ordering.
    match sort {
        SortKey::AddedDesc => "added_at DESC, id DESC",
        SortKey::RatingDesc => "rating DESC, id ASC",
        SortKey::TitleAsc => "title COLLATE NOCASE ASC, id ASC",
        SortKey::AuthorAsc => "author COLLATE NOCASE ASC, id ASC",
        SortKey::YearDesc => "year DESC, id ASC",
    }
}

/// Escapes LIKE wildcards so a search term always matches literally.
fn escape_like_term(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let book = Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        genre: row.get("genre")?,
        year: row.get("year")?,
        rating: row.get("rating")?,
        opinion: row.get("opinion")?,
        cover_url: row.get("cover_url")?,
        added_at: row.get("added_at")?,
    };

    if book.title.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank title in books row id={}",
            book.id
        )));
    }
    if book.author.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank author in books row id={}",
            book.id
        )));
    }
    if let Some(rating) = book.rating {
        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(RepoError::InvalidData(format!(
                "rating {rating} out of range in books row id={}",
                book.id
            )));
        }
    }

    Ok(book)
}

pub(crate) fn ensure_book_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "books")? {
        return Err(RepoError::MissingRequiredTable("books"));
    }

    for &column in REQUIRED_BOOK_COLUMNS {
        if !table_has_column(conn, "books", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "books",
                column,
            });
        }
    }

    Ok(())
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
