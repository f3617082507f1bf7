use bibliotech_core::db::open_db_in_memory;
use bibliotech_core::{
    CatalogService, NewBook, NewComment, RepoError, ReviewPatch, SqliteBookRepository,
    SqliteCommentRepository,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> CatalogService<SqliteBookRepository<'_>, SqliteCommentRepository<'_>> {
    let books = SqliteBookRepository::try_new(conn).unwrap();
    let comments = SqliteCommentRepository::try_new(conn).unwrap();
    CatalogService::new(books, comments)
}

#[test]
fn service_wraps_book_and_comment_stores() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let book = service
        .add_book(&NewBook::new("Dom Casmurro", "Machado de Assis"))
        .unwrap();
    let fetched = service.get_book(book.id).unwrap().unwrap();
    assert_eq!(fetched, book);
    assert_eq!(service.list_books().unwrap(), vec![book.clone()]);

    let comment = service
        .add_comment(book.id, &NewComment::new("ana", "clássico"))
        .unwrap();
    assert_eq!(service.comments_for_book(book.id).unwrap(), vec![comment]);
}

#[test]
fn search_books_scans_all_text_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut draft = NewBook::new("Cem Anos de Solidão", "Gabriel García Márquez");
    draft.genre = Some("Realismo Mágico".to_string());
    service.add_book(&draft).unwrap();
    service.add_book(&NewBook::new("1984", "George Orwell")).unwrap();

    let hits = service.search_books("solidão").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Cem Anos de Solidão");

    assert!(service.search_books("tolstói").unwrap().is_empty());
}

#[test]
fn top_rated_returns_best_first_up_to_limit() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for (title, rating) in [("a", 3.0), ("b", 4.9), ("c", 4.1)] {
        let mut draft = NewBook::new(title, "author");
        draft.rating = Some(rating);
        service.add_book(&draft).unwrap();
    }
    service.add_book(&NewBook::new("unrated", "author")).unwrap();

    let shelf = service.top_rated(2).unwrap();
    let titles: Vec<_> = shelf.iter().map(|book| book.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c"]);
}

#[test]
fn review_errors_propagate_through_the_service() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .review_book(
            999,
            &ReviewPatch {
                rating: Some(5.0),
                opinion: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(999)));

    let book = service.add_book(&NewBook::new("a", "x")).unwrap();
    let err = service
        .review_book(
            book.id,
            &ReviewPatch {
                rating: Some(7.0),
                opinion: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
