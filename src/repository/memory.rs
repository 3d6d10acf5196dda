//! In-process document store.
//!
//! Keeps both collections in insertion order behind a tokio `RwLock`. Used by
//! the test suite and by `store.backend = "memory"`.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Book, BookFilter, CreateBook, NewTransaction, Transaction, TransactionFilter,
        TransactionKind,
    },
};

use super::{BookStore, TransactionStore};

#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<Vec<Book>>,
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, book: &CreateBook) -> AppResult<Book> {
        let created = Book {
            id: Uuid::new_v4(),
            name: book.name.clone(),
            category: book.category.clone(),
            rent: book.rent,
        };
        self.books.write().await.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn find(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        Ok(self
            .books
            .read()
            .await
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn find_first(&self, filter: &BookFilter) -> AppResult<Option<Book>> {
        Ok(self
            .books
            .read()
            .await
            .iter()
            .find(|b| filter.matches(b))
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| b.id != id);
        Ok(books.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    transactions: RwLock<Vec<Transaction>>,
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, transaction: &NewTransaction) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        self.transactions
            .write()
            .await
            .push(transaction.clone().into_transaction(id));
        Ok(id)
    }

    async fn find(&self, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &TransactionFilter) -> AppResult<i64> {
        let count = self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| filter.matches(t))
            .count();
        Ok(count as i64)
    }

    async fn close_active_issue(
        &self,
        book: Uuid,
        issuer: &str,
    ) -> AppResult<Option<Transaction>> {
        let filter = TransactionFilter::active_issue(book, issuer);
        let mut transactions = self.transactions.write().await;

        let Some(issue) = transactions.iter_mut().find(|t| filter.matches(t)) else {
            return Ok(None);
        };
        let before = issue.clone();
        issue.kind = TransactionKind::Issue {
            currently_issued: false,
        };
        Ok(Some(before))
    }
}
