//! Repository layer: the document store behind the catalog and the ledger

pub mod books;
pub mod memory;
pub mod transactions;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookFilter, CreateBook, NewTransaction, Transaction, TransactionFilter},
};

/// Books collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: &CreateBook) -> AppResult<Book>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Book>>;
    /// Matching books in insertion order
    async fn find(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;
    /// First matching book in insertion order
    async fn find_first(&self, filter: &BookFilter) -> AppResult<Option<Book>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Transactions collection (the ledger)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, transaction: &NewTransaction) -> AppResult<Uuid>;
    /// Matching transactions in insertion order
    async fn find(&self, filter: &TransactionFilter) -> AppResult<Vec<Transaction>>;
    async fn count(&self, filter: &TransactionFilter) -> AppResult<i64>;
    /// Clear `currently_issued` on the earliest active issue of `book` to `issuer`.
    ///
    /// Returns that issue as it was before the update, or `None` when the pair
    /// has no active issue.
    async fn close_active_issue(&self, book: Uuid, issuer: &str)
        -> AppResult<Option<Transaction>>;
}

/// Main repository struct holding both collections
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub books: Arc<dyn BookStore>,
    pub transactions: Arc<dyn TransactionStore>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookStore::new(pool.clone())),
            transactions: Arc::new(transactions::PgTransactionStore::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository that keeps everything in process memory
    pub fn in_memory() -> Self {
        Self::from_stores(
            Arc::new(memory::MemoryBookStore::default()),
            Arc::new(memory::MemoryTransactionStore::default()),
        )
    }

    pub fn from_stores(
        books: Arc<dyn BookStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            pool: None,
            books,
            transactions,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(ref pool) = self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }

    /// Release store connections
    pub async fn close(&self) {
        if let Some(ref pool) = self.pool {
            pool.close().await;
            tracing::info!("Database connections closed");
        }
    }
}
