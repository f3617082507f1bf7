//! Use-case services orchestrating repository access.
//!
//! # Responsibility
//! - Offer stable catalog entry points to callers (CLI, future UI shells).
//! - Delegate persistence to injected repository implementations.

pub mod catalog_service;
