use bibliotech_core::db::open_db_in_memory;
use bibliotech_core::{
    BookRepository, CatalogQuery, NewBook, SortKey, SqliteBookRepository,
};
use rusqlite::Connection;

struct Seed {
    title: &'static str,
    author: &'static str,
    genre: Option<&'static str>,
    year: Option<i32>,
    rating: Option<f64>,
}

const SEEDS: &[Seed] = &[
    Seed {
        title: "Dom Casmurro",
        author: "Machado de Assis",
        genre: Some("Romance"),
        year: Some(1899),
        rating: Some(5.0),
    },
    Seed {
        title: "1984",
        author: "George Orwell",
        genre: Some("Ficção Distópica"),
        year: Some(1949),
        rating: Some(4.7),
    },
    Seed {
        title: "Cem Anos de Solidão",
        author: "Gabriel García Márquez",
        genre: Some("Realismo Mágico"),
        year: Some(1967),
        rating: Some(4.8),
    },
    Seed {
        title: "o cortiço",
        author: "aluísio azevedo",
        genre: Some("Romance"),
        year: Some(1890),
        rating: None,
    },
    Seed {
        title: "Rascunho sem gênero",
        author: "Anônimo",
        genre: None,
        year: None,
        rating: Some(2.0),
    },
];

fn seeded_catalog(conn: &Connection) -> SqliteBookRepository<'_> {
    let repo = SqliteBookRepository::try_new(conn).unwrap();
    for seed in SEEDS {
        let mut draft = NewBook::new(seed.title, seed.author);
        draft.genre = seed.genre.map(str::to_string);
        draft.year = seed.year;
        draft.rating = seed.rating;
        repo.insert_book(&draft).unwrap();
    }
    repo
}

fn titles(books: &[bibliotech_core::Book]) -> Vec<&str> {
    books.iter().map(|book| book.title.as_str()).collect()
}

#[test]
fn default_query_returns_everything_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let books = repo.query_books(&CatalogQuery::default()).unwrap();
    assert_eq!(books.len(), SEEDS.len());
    // Inserts may share an added_at millisecond; id descending keeps the
    // reverse-insertion order deterministic.
    let ids: Vec<_> = books.iter().map(|book| book.id).collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);
}

#[test]
fn genre_filter_keeps_members_of_the_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let query = CatalogQuery {
        genres: vec!["Romance".to_string(), "Realismo Mágico".to_string()],
        ..CatalogQuery::default()
    };
    let books = repo.query_books(&query).unwrap();
    assert_eq!(
        titles(&books),
        vec!["o cortiço", "Cem Anos de Solidão", "Dom Casmurro"]
    );
}

#[test]
fn min_rating_excludes_unrated_books_for_positive_thresholds() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let query = CatalogQuery {
        min_rating: Some(4.0),
        ..CatalogQuery::default()
    };
    let books = repo.query_books(&query).unwrap();
    assert_eq!(books.len(), 3);
    assert!(books.iter().all(|book| book.rating.unwrap() >= 4.0));
}

#[test]
fn min_rating_zero_filters_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let query = CatalogQuery {
        min_rating: Some(0.0),
        ..CatalogQuery::default()
    };
    let books = repo.query_books(&query).unwrap();
    assert_eq!(books.len(), SEEDS.len());
}

#[test]
fn search_matches_title_author_or_genre_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let by_title = repo
        .query_books(&CatalogQuery {
            search: Some("casmurro".to_string()),
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&by_title), vec!["Dom Casmurro"]);

    let by_author = repo
        .query_books(&CatalogQuery {
            search: Some("ORWELL".to_string()),
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&by_author), vec!["1984"]);

    let by_genre = repo
        .query_books(&CatalogQuery {
            search: Some("romance".to_string()),
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(by_genre.len(), 2);
}

#[test]
fn search_treats_like_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    repo.insert_book(&NewBook::new("100% Rust", "Ferris")).unwrap();
    repo.insert_book(&NewBook::new("100 days", "Ferris")).unwrap();

    let books = repo
        .query_books(&CatalogQuery {
            search: Some("100%".to_string()),
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&books), vec!["100% Rust"]);
}

#[test]
fn blank_search_term_filters_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let books = repo
        .query_books(&CatalogQuery {
            search: Some("   ".to_string()),
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(books.len(), SEEDS.len());
}

#[test]
fn sort_by_rating_desc_puts_unrated_last() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let books = repo
        .query_books(&CatalogQuery {
            sort: SortKey::RatingDesc,
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(
        titles(&books),
        vec![
            "Dom Casmurro",
            "Cem Anos de Solidão",
            "1984",
            "Rascunho sem gênero",
            "o cortiço",
        ]
    );
}

#[test]
fn sort_by_title_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let books = repo
        .query_books(&CatalogQuery {
            sort: SortKey::TitleAsc,
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(
        titles(&books),
        vec![
            "1984",
            "Cem Anos de Solidão",
            "Dom Casmurro",
            "o cortiço",
            "Rascunho sem gênero",
        ]
    );
}

#[test]
fn sort_by_author_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let books = repo
        .query_books(&CatalogQuery {
            sort: SortKey::AuthorAsc,
            ..CatalogQuery::default()
        })
        .unwrap();
    let authors: Vec<_> = books.iter().map(|book| book.author.as_str()).collect();
    assert_eq!(
        authors,
        vec![
            "aluísio azevedo",
            "Anônimo",
            "Gabriel García Márquez",
            "George Orwell",
            "Machado de Assis",
        ]
    );
}

#[test]
fn sort_by_year_desc_puts_undated_last() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let books = repo
        .query_books(&CatalogQuery {
            sort: SortKey::YearDesc,
            ..CatalogQuery::default()
        })
        .unwrap();
    let years: Vec<_> = books.iter().map(|book| book.year).collect();
    assert_eq!(
        years,
        vec![Some(1967), Some(1949), Some(1899), Some(1890), None]
    );
}

#[test]
fn pagination_is_stable_under_fixed_ordering() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    let page = repo
        .query_books(&CatalogQuery {
            sort: SortKey::TitleAsc,
            limit: Some(2),
            offset: 1,
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&page), vec!["Cem Anos de Solidão", "Dom Casmurro"]);

    let offset_only = repo
        .query_books(&CatalogQuery {
            sort: SortKey::TitleAsc,
            offset: 3,
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&offset_only), vec!["o cortiço", "Rascunho sem gênero"]);
}

#[test]
fn filters_compose_with_sort_and_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_catalog(&conn);

    // Top-rated pick restricted to one genre, the shape the "popular books"
    // shelf uses.
    let books = repo
        .query_books(&CatalogQuery {
            genres: vec!["Romance".to_string()],
            min_rating: Some(1.0),
            sort: SortKey::RatingDesc,
            limit: Some(1),
            ..CatalogQuery::default()
        })
        .unwrap();
    assert_eq!(titles(&books), vec!["Dom Casmurro"]);
}
