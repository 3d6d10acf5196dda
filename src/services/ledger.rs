//! Lending ledger service: issue and return of books

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    config::LedgerConfig,
    error::{AppError, AppResult},
    models::{NewTransaction, TransactionFilter},
    repository::Repository,
};

use super::{catalog::CatalogService, locks::IssueLocks};

/// Whole days elapsed from `from` to `to`, rounded down.
///
/// Negative when `to` precedes `from`; a return one hour before its issue
/// counts as -1 day.
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let elapsed = to - from;
    let days = elapsed.num_days();
    if elapsed < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

/// Rent owed for `days` days at `rent` per day
pub fn rent_for(days: i64, rent: i64) -> AppResult<i64> {
    days.checked_mul(rent).ok_or_else(|| {
        AppError::InvalidDateRange(format!("rent for {} days at {} per day overflows", days, rent))
    })
}

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    catalog: CatalogService,
    locks: IssueLocks,
    policy: LedgerConfig,
}

impl LedgerService {
    pub fn new(repository: Repository, catalog: CatalogService, policy: LedgerConfig) -> Self {
        Self {
            repository,
            catalog,
            locks: IssueLocks::default(),
            policy,
        }
    }

    /// Record that a book went out to an issuer
    pub async fn issue_book(
        &self,
        book_query: &str,
        issuer: &str,
        date: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let book = self.catalog.resolve_book(book_query).await?;
        let _guard = self.lock(book.id, issuer).await;

        if !self.policy.allow_reissue {
            let active = self
                .repository
                .transactions
                .count(&TransactionFilter::active_issue(book.id, issuer))
                .await?;
            if active > 0 {
                return Err(AppError::AlreadyIssued {
                    book: book.id,
                    issuer: issuer.to_string(),
                });
            }
        }

        let id = self
            .repository
            .transactions
            .insert(&NewTransaction::issue(book.id, issuer, date))
            .await?;

        tracing::info!(transaction = %id, book = %book.id, issuer, "Book issued");
        Ok(id)
    }

    /// Record that a book came back, closing its active issue and fixing the rent due
    pub async fn return_book(
        &self,
        book_query: &str,
        issuer: &str,
        date: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let book = self.catalog.resolve_book(book_query).await?;
        let _guard = self.lock(book.id, issuer).await;

        let no_active_issue = || AppError::NoActiveIssue {
            book: book.id,
            issuer: issuer.to_string(),
        };

        // Every check runs before the flag flips, so a failed return leaves the issue open.
        let open = self
            .repository
            .transactions
            .find(&TransactionFilter::active_issue(book.id, issuer))
            .await?;
        let earliest = open.first().ok_or_else(no_active_issue)?;
        if self.policy.reject_backdated_returns && date < earliest.date {
            return Err(AppError::InvalidDateRange(format!(
                "return date {} precedes issue date {}",
                date, earliest.date
            )));
        }
        let mut days = elapsed_days(earliest.date, date);
        let mut rent_due = rent_for(days, book.rent)?;

        let issue = self
            .repository
            .transactions
            .close_active_issue(book.id, issuer)
            .await?
            .ok_or_else(no_active_issue)?;

        // Another process may have closed the earliest issue in between.
        if issue.id != earliest.id {
            days = elapsed_days(issue.date, date);
            rent_due = rent_for(days, book.rent)?;
        }
        if days < 0 {
            tracing::warn!(book = %book.id, issuer, days, "Return dated before its issue");
        }

        let id = self
            .repository
            .transactions
            .insert(&NewTransaction::returned(book.id, issuer, date, rent_due))
            .await?;

        tracing::info!(
            transaction = %id,
            issue = %issue.id,
            book = %book.id,
            issuer,
            days,
            rent_due,
            "Book returned"
        );
        Ok(id)
    }

    async fn lock(&self, book: Uuid, issuer: &str) -> Option<tokio::sync::OwnedMutexGuard<()>> {
        if self.policy.serialize_mutations {
            Some(self.locks.acquire(book, issuer).await)
        } else {
            None
        }
    }
}
