//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical book record and its insert/update inputs.
//! - Validate required fields and numeric bounds before persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another book.
//! - `title` and `author` are non-empty after trimming.
//! - `rating`, when present, stays within [`RATING_MIN`], [`RATING_MAX`].
//! - `added_at` is stamped once on insert and never changes.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier assigned by the store on insert.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BookId = i64;

/// Lowest accepted rating value.
pub const RATING_MIN: f64 = 0.0;
/// Highest accepted rating value.
pub const RATING_MAX: f64 = 5.0;
/// Earliest accepted publication year.
pub const YEAR_MIN: i32 = 1;
/// Latest accepted publication year.
pub const YEAR_MAX: i32 = 9999;

/// Canonical stored record for one catalog entry.
///
/// `rating` and `opinion` are the only fields mutable after insert; everything
/// else is fixed for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned stable id.
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Absent when the caller supplied no genre (or a blank one).
    pub genre: Option<String>,
    /// Publication year, bounded to [`YEAR_MIN`]..=[`YEAR_MAX`].
    pub year: Option<i32>,
    /// Reader rating in [`RATING_MIN`]..=[`RATING_MAX`].
    pub rating: Option<f64>,
    /// Free-text synopsis or reader opinion.
    pub opinion: Option<String>,
    /// Optional cover image location.
    pub cover_url: Option<String>,
    /// Insert timestamp in epoch milliseconds. Immutable.
    pub added_at: i64,
}

/// Insert input for [`Book`]. The store assigns `id` and `added_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub opinion: Option<String>,
    pub cover_url: Option<String>,
}

/// Partial update applied to an existing book's review fields.
///
/// `None` leaves the stored value unchanged. A blank `opinion` clears the
/// stored opinion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<f64>,
    pub opinion: Option<String>,
}

/// Validation failure for book inserts and review updates.
#[derive(Debug, Clone, PartialEq)]
pub enum BookValidationError {
    MissingTitle,
    MissingAuthor,
    RatingOutOfRange(f64),
    YearOutOfRange(i32),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "title must not be empty"),
            Self::MissingAuthor => write!(f, "author must not be empty"),
            Self::RatingOutOfRange(value) => write!(
                f,
                "rating {value} is outside the accepted range {RATING_MIN}..={RATING_MAX}"
            ),
            Self::YearOutOfRange(value) => write!(
                f,
                "year {value} is outside the accepted range {YEAR_MIN}..={YEAR_MAX}"
            ),
        }
    }
}

impl Error for BookValidationError {}

impl NewBook {
    /// Creates an insert draft with required fields only.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with all text fields normalized.
    ///
    /// Required fields are trimmed in place; blank optional fields collapse
    /// to `None` so that "" never reaches storage as a phantom value.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: normalize_optional_text(self.genre.as_deref()),
            year: self.year,
            rating: self.rating,
            opinion: normalize_optional_text(self.opinion.as_deref()),
            cover_url: normalize_optional_text(self.cover_url.as_deref()),
        }
    }

    /// Checks required fields and numeric bounds.
    ///
    /// Expects a normalized draft; a whitespace-only title would otherwise
    /// pass as non-empty.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::MissingTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::MissingAuthor);
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if let Some(year) = self.year {
            if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
                return Err(BookValidationError::YearOutOfRange(year));
            }
        }
        Ok(())
    }
}

impl ReviewPatch {
    /// Checks rating bounds for a review update.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }

    /// Returns whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.opinion.is_none()
    }
}

fn validate_rating(rating: f64) -> Result<(), BookValidationError> {
    if !rating.is_finite() || !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(BookValidationError::RatingOutOfRange(rating));
    }
    Ok(())
}

/// Collapses blank or whitespace-only text to `None`.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
