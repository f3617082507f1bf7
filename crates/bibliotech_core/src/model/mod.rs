//! Domain model for the book catalog.
//!
//! # Responsibility
//! - Define canonical records persisted by the catalog store.
//! - Own field validation and boundary normalization rules.
//!
//! # Invariants
//! - Every stored record is identified by a store-assigned `BookId`.
//! - Blank optional text is normalized to `None` before persistence.

pub mod book;
pub mod comment;
