//! Data models for Lendlog

pub mod book;
pub mod transaction;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookQuery, CreateBook};
pub use transaction::{
    ActivityEntry, IssuerSummary, NewTransaction, Transaction, TransactionFilter, TransactionKind,
    TransactionType,
};
