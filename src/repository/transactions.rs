//! Transactions (ledger) repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewTransaction, Transaction, TransactionFilter, TransactionKind, TransactionType},
};

use super::TransactionStore;

const COLUMNS: &str = "id, book, issuer, transaction_type, date, currently_issued, rent_due";

/// Flat row layout of the transactions table
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    book: Uuid,
    issuer: String,
    transaction_type: String,
    date: DateTime<Utc>,
    currently_issued: Option<bool>,
    rent_due: Option<i64>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = match row.transaction_type.parse::<TransactionType>() {
            Ok(TransactionType::Issue) => TransactionKind::Issue {
                currently_issued: row.currently_issued.unwrap_or(false),
            },
            Ok(TransactionType::Return) => TransactionKind::Return {
                rent_due: row.rent_due.ok_or_else(|| {
                    AppError::Internal(format!("Return transaction {} has no rent due", row.id))
                })?,
            },
            Err(e) => return Err(AppError::Internal(e)),
        };

        Ok(Transaction {
            id: row.id,
            book: row.book,
            issuer: row.issuer,
            date: row.date,
            kind,
        })
    }
}

#[derive(Clone)]
pub struct PgTransactionStore {
    pool: Pool<Postgres>,
}

impl PgTransactionStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
        query.push(" WHERE TRUE");

        if let Some(book) = filter.book {
            query.push(" AND book = ").push_bind(book);
        }
        if let Some(ref issuer) = filter.issuer {
            query.push(" AND issuer = ").push_bind(issuer.clone());
        }
        if let Some(ref issuer) = filter.issuer_contains {
            query
                .push(" AND strpos(lower(issuer), lower(")
                .push_bind(issuer.clone())
                .push(")) > 0");
        }
        if let Some(kind) = filter.transaction_type {
            query.push(" AND transaction_type = ").push_bind(kind.as_str());
        }
        if let Some(flag) = filter.currently_issued {
            query.push(" AND currently_issued = ").push_bind(flag);
        }
        if let Some(start) = filter.date_after {
            query.push(" AND date > ").push_bind(start);
        }
        if let Some(end) = filter.date_before {
            query.push(" AND date < ").push_bind(end);
        }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, transaction: &NewTransaction) -> AppResult<Uuid> {
        let (currently_issued, rent_due) = match transaction.kind {
            TransactionKind::Issue { currently_issued } => (Some(currently_issued), None),
            TransactionKind::Return { rent_due } => (None, Some(rent_due)),
        };

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO transactions
                (book, issuer, transaction_type, date, currently_issued, rent_due)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(transaction.book)
        .bind(&transaction.issuer)
        .bind(transaction.kind.transaction_type().as_str())
        .bind(transaction.date)
        .bind(currently_issued)
        .bind(rent_due)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find(&self, filter: &TransactionFilter) -> AppResult<Vec<Transaction>> {
        let mut query = QueryBuilder::new(format!("SELECT {} FROM transactions", COLUMNS));
        Self::push_filter(&mut query, filter);
        query.push(" ORDER BY seq");

        query
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn count(&self, filter: &TransactionFilter) -> AppResult<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM transactions");
        Self::push_filter(&mut query, filter);

        let count: i64 = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn close_active_issue(
        &self,
        book: Uuid,
        issuer: &str,
    ) -> AppResult<Option<Transaction>> {
        // The row lock keeps two concurrent returns from closing the same issue.
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            WITH target AS (
                SELECT id FROM transactions
                WHERE book = $1 AND issuer = $2
                  AND transaction_type = 'issue' AND currently_issued
                ORDER BY seq
                LIMIT 1
                FOR UPDATE
            )
            UPDATE transactions t SET currently_issued = FALSE
            FROM target
            WHERE t.id = target.id
            RETURNING t.id, t.book, t.issuer, t.transaction_type, t.date,
                      TRUE AS currently_issued, t.rent_due
            "#,
        )
        .bind(book)
        .bind(issuer)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }
}
