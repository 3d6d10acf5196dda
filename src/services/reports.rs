//! Reports folded from the ledger

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ActivityEntry, IssuerSummary, Transaction, TransactionFilter, TransactionType},
    repository::Repository,
};

use super::catalog::CatalogService;

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    catalog: CatalogService,
}

impl ReportsService {
    pub fn new(repository: Repository, catalog: CatalogService) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Lifetime rent collected for a book
    pub async fn total_rent_for_book(&self, book_query: &str) -> AppResult<i64> {
        let book = self.catalog.resolve_book(book_query).await?;
        let returns = self
            .repository
            .transactions
            .find(&TransactionFilter {
                book: Some(book.id),
                transaction_type: Some(TransactionType::Return),
                ..Default::default()
            })
            .await?;

        returns
            .iter()
            .filter_map(Transaction::rent_due)
            .try_fold(0i64, i64::checked_add)
            .ok_or_else(|| {
                AppError::Internal(format!("total rent of book {} overflows", book.id))
            })
    }

    /// Issue count and current holders of the book with exactly this name
    pub async fn issuer_summary(&self, name: &str) -> AppResult<IssuerSummary> {
        let book = self.catalog.resolve_book_exact(name).await?;

        let issuer_count = self
            .repository
            .transactions
            .count(&TransactionFilter {
                book: Some(book.id),
                transaction_type: Some(TransactionType::Issue),
                ..Default::default()
            })
            .await?;

        let current_issuers = self
            .repository
            .transactions
            .find(&TransactionFilter {
                book: Some(book.id),
                currently_issued: Some(true),
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|t| t.issuer)
            .collect();

        Ok(IssuerSummary {
            issuer_count,
            current_issuers,
        })
    }

    /// Names of the books issued to issuers matching `issuer_query`, in ledger order
    pub async fn books_issued_to(&self, issuer_query: &str) -> AppResult<Vec<String>> {
        let issues = self
            .repository
            .transactions
            .find(&TransactionFilter {
                issuer_contains: Some(issuer_query.to_string()),
                transaction_type: Some(TransactionType::Issue),
                ..Default::default()
            })
            .await?;

        let mut names = BookNames::new(&self.repository);
        let mut books = Vec::with_capacity(issues.len());
        for issue in &issues {
            if let Some(name) = names.lookup(issue).await? {
                books.push(name);
            }
        }
        Ok(books)
    }

    /// Transactions of any type dated strictly between `start` and `end`
    pub async fn activity_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<ActivityEntry>> {
        let transactions = self
            .repository
            .transactions
            .find(&TransactionFilter {
                date_after: Some(start),
                date_before: Some(end),
                ..Default::default()
            })
            .await?;

        let mut names = BookNames::new(&self.repository);
        let mut activity = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            if let Some(book) = names.lookup(&transaction).await? {
                activity.push(ActivityEntry {
                    book,
                    issuer: transaction.issuer,
                });
            }
        }
        Ok(activity)
    }
}

/// Book name lookups cached for the duration of one report
struct BookNames<'a> {
    repository: &'a Repository,
    cache: HashMap<Uuid, Option<String>>,
}

impl<'a> BookNames<'a> {
    fn new(repository: &'a Repository) -> Self {
        Self {
            repository,
            cache: HashMap::new(),
        }
    }

    /// Name of the transaction's book, or `None` when it left the catalog
    async fn lookup(&mut self, transaction: &Transaction) -> AppResult<Option<String>> {
        if let Some(name) = self.cache.get(&transaction.book) {
            return Ok(name.clone());
        }

        let name = self
            .repository
            .books
            .get(transaction.book)
            .await?
            .map(|b| b.name);
        if name.is_none() {
            tracing::warn!(
                transaction = %transaction.id,
                book = %transaction.book,
                "Transaction references a book missing from the catalog"
            );
        }
        self.cache.insert(transaction.book, name.clone());
        Ok(name)
    }
}
