//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `bibliotech_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use bibliotech_core::db::migrations::latest_version;
use bibliotech_core::db::open_db_in_memory;
use bibliotech_core::{CatalogService, SqliteBookRepository, SqliteCommentRepository};

fn main() {
    println!("bibliotech_core version={}", bibliotech_core::core_version());
    println!("bibliotech_core schema_version={}", latest_version());

    // Open a throwaway in-memory catalog to prove the full storage path
    // (migrations, repositories, stats) links and runs.
    match smoke_stats() {
        Ok(line) => println!("{line}"),
        Err(err) => {
            eprintln!("bibliotech_core smoke check failed: {err}");
            std::process::exit(1);
        }
    }
}

fn smoke_stats() -> Result<String, Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let books = SqliteBookRepository::try_new(&conn)?;
    let comments = SqliteCommentRepository::try_new(&conn)?;
    let service = CatalogService::new(books, comments);

    let stats = service.stats()?;
    Ok(format!(
        "bibliotech_core smoke books={} comments={}",
        stats.book_count, stats.comment_count
    ))
}
