//! Ledger transaction model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Issue,
    Return,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Issue => "issue",
            TransactionType::Return => "return",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue" => Ok(TransactionType::Issue),
            "return" => Ok(TransactionType::Return),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// Type-dependent part of a transaction.
///
/// `currently_issued` is the only field of the ledger that ever changes after
/// insertion, and only the store's `close_active_issue` may change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transactionType", rename_all = "lowercase")]
pub enum TransactionKind {
    Issue {
        #[serde(rename = "currentlyIssued")]
        currently_issued: bool,
    },
    Return {
        #[serde(rename = "rentDue")]
        rent_due: i64,
    },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Issue { .. } => TransactionType::Issue,
            TransactionKind::Return { .. } => TransactionType::Return,
        }
    }
}

/// A recorded ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub book: Uuid,
    pub issuer: String,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// An issue that has not been closed by a return yet
    pub fn is_active_issue(&self) -> bool {
        matches!(self.kind, TransactionKind::Issue { currently_issued: true })
    }

    pub fn rent_due(&self) -> Option<i64> {
        match self.kind {
            TransactionKind::Return { rent_due } => Some(rent_due),
            TransactionKind::Issue { .. } => None,
        }
    }
}

/// A transaction to append; the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub book: Uuid,
    pub issuer: String,
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
}

impl NewTransaction {
    pub fn issue(book: Uuid, issuer: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            book,
            issuer: issuer.into(),
            date,
            kind: TransactionKind::Issue {
                currently_issued: true,
            },
        }
    }

    pub fn returned(
        book: Uuid,
        issuer: impl Into<String>,
        date: DateTime<Utc>,
        rent_due: i64,
    ) -> Self {
        Self {
            book,
            issuer: issuer.into(),
            date,
            kind: TransactionKind::Return { rent_due },
        }
    }

    pub fn into_transaction(self, id: Uuid) -> Transaction {
        Transaction {
            id,
            book: self.book,
            issuer: self.issuer,
            date: self.date,
            kind: self.kind,
        }
    }
}

/// Filter over the transactions collection.
///
/// Every populated field must match. Date bounds are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub book: Option<Uuid>,
    pub issuer: Option<String>,
    pub issuer_contains: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub currently_issued: Option<bool>,
    pub date_after: Option<DateTime<Utc>>,
    pub date_before: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// Active issues of a book to one issuer
    pub fn active_issue(book: Uuid, issuer: impl Into<String>) -> Self {
        Self {
            book: Some(book),
            issuer: Some(issuer.into()),
            transaction_type: Some(TransactionType::Issue),
            currently_issued: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.book.is_some_and(|book| book != tx.book) {
            return false;
        }
        if let Some(ref issuer) = self.issuer {
            if &tx.issuer != issuer {
                return false;
            }
        }
        if let Some(ref query) = self.issuer_contains {
            if !super::book::contains_ignore_case(&tx.issuer, query) {
                return false;
            }
        }
        if self
            .transaction_type
            .is_some_and(|kind| kind != tx.transaction_type())
        {
            return false;
        }
        if let Some(flag) = self.currently_issued {
            match tx.kind {
                TransactionKind::Issue { currently_issued } if currently_issued == flag => {}
                _ => return false,
            }
        }
        if self.date_after.is_some_and(|start| tx.date <= start) {
            return false;
        }
        if self.date_before.is_some_and(|end| tx.date >= end) {
            return false;
        }
        true
    }
}

/// Issue statistics for a single book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSummary {
    /// Number of issues ever recorded for the book
    pub issuer_count: i64,
    /// Issuers currently holding the book
    pub current_issuers: Vec<String>,
}

/// A transaction annotated with its book name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ActivityEntry {
    pub book: String,
    pub issuer: String,
}
