//! PostgreSQL store tests
//!
//! Run against a live database with:
//! DATABASE_URL=postgres://... cargo test --test postgres_tests -- --ignored

use chrono::{DateTime, Duration, TimeZone, Utc};
use lendlog_server::{
    models::{Book, BookFilter, CreateBook, NewTransaction, TransactionFilter, TransactionType},
    repository::Repository,
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn repository() -> Option<Repository> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(Repository::postgres(pool))
}

/// Unique marker keeping rows of one run apart from earlier ones
fn marker() -> String {
    Uuid::new_v4().simple().to_string()
}

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

async fn add_book(repository: &Repository, name: &str, category: &str, rent: i64) -> Book {
    repository
        .books
        .insert(&CreateBook {
            name: name.to_string(),
            category: category.to_string(),
            rent,
        })
        .await
        .expect("Failed to insert book")
}

#[tokio::test]
#[ignore]
async fn test_pg_name_lookup_prefers_first_inserted() {
    let Some(repository) = repository().await else {
        return;
    };
    let m = marker();
    let messiah = add_book(&repository, &format!("Dune {} Messiah", m), "Fiction", 5).await;
    let dune = add_book(&repository, &format!("DUNE {}", m), "Fiction", 7).await;

    let query = format!("dune {}", m.to_uppercase());
    let first = repository
        .books
        .find_first(&BookFilter::name_contains(query.clone()))
        .await
        .unwrap();
    assert_eq!(first, Some(messiah));

    let all = repository
        .books
        .find(&BookFilter::name_contains(query))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let exact = repository
        .books
        .find(&BookFilter::name_exact(format!("DUNE {}", m)))
        .await
        .unwrap();
    assert_eq!(exact, vec![dune.clone()]);
    assert!(repository
        .books
        .find(&BookFilter::name_exact(format!("dune {}", m)))
        .await
        .unwrap()
        .is_empty());

    assert!(repository.books.delete(dune.id).await.unwrap());
    assert_eq!(repository.books.get(dune.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_pg_rent_bounds_are_exclusive() {
    let Some(repository) = repository().await else {
        return;
    };
    let category = marker();
    for (name, rent) in [("A", 5), ("B", 6), ("C", 9), ("D", 10)] {
        add_book(&repository, name, &category, rent).await;
    }

    let books = repository
        .books
        .find(&BookFilter {
            category: Some(category),
            rent_above: Some(5),
            rent_below: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C"]);
}

#[tokio::test]
#[ignore]
async fn test_pg_transaction_filters() {
    let Some(repository) = repository().await else {
        return;
    };
    let book = Uuid::new_v4();
    let issuer = format!("Ann {}", marker());
    for n in 1..=3 {
        repository
            .transactions
            .insert(&NewTransaction::issue(book, issuer.clone(), day(n)))
            .await
            .unwrap();
    }
    repository
        .transactions
        .insert(&NewTransaction::returned(book, issuer.clone(), day(4), 21))
        .await
        .unwrap();

    let between = repository
        .transactions
        .find(&TransactionFilter {
            book: Some(book),
            date_after: Some(day(1)),
            date_before: Some(day(3)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(between.len(), 1);
    assert_eq!(between[0].date, day(2));

    let by_issuer = TransactionFilter {
        issuer_contains: Some(issuer.to_uppercase()),
        transaction_type: Some(TransactionType::Issue),
        ..Default::default()
    };
    assert_eq!(repository.transactions.count(&by_issuer).await.unwrap(), 3);

    let returns = repository
        .transactions
        .find(&TransactionFilter {
            book: Some(book),
            transaction_type: Some(TransactionType::Return),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(returns.len(), 1);
    assert_eq!(returns[0].rent_due(), Some(21));
}

#[tokio::test]
#[ignore]
async fn test_pg_close_active_issue_takes_earliest() {
    let Some(repository) = repository().await else {
        return;
    };
    let book = Uuid::new_v4();
    let issuer = marker();
    let earliest = repository
        .transactions
        .insert(&NewTransaction::issue(book, issuer.clone(), day(1)))
        .await
        .unwrap();
    let later = repository
        .transactions
        .insert(&NewTransaction::issue(book, issuer.clone(), day(2)))
        .await
        .unwrap();

    let closed = repository
        .transactions
        .close_active_issue(book, &issuer)
        .await
        .unwrap()
        .expect("an active issue");
    assert_eq!(closed.id, earliest);

    let active = repository
        .transactions
        .find(&TransactionFilter::active_issue(book, issuer.clone()))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, later);
}

#[tokio::test]
#[ignore]
async fn test_pg_concurrent_closes_flip_one_issue() {
    let Some(repository) = repository().await else {
        return;
    };
    let book = Uuid::new_v4();
    let issuer = marker();
    repository
        .transactions
        .insert(&NewTransaction::issue(book, issuer.clone(), day(1)))
        .await
        .unwrap();

    let first = repository.transactions.clone();
    let second = repository.transactions.clone();
    let (a, b) = tokio::join!(
        first.close_active_issue(book, &issuer),
        second.close_active_issue(book, &issuer)
    );
    let closed = [a.unwrap(), b.unwrap()]
        .into_iter()
        .filter(Option::is_some)
        .count();
    assert_eq!(closed, 1);

    let active = repository
        .transactions
        .count(&TransactionFilter::active_issue(book, issuer))
        .await
        .unwrap();
    assert_eq!(active, 0);
}
