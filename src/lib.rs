//! Lendlog book lending server
//!
//! Keeps a catalog of books and a ledger of issue/return transactions, and
//! reports the rent owed per book and the lending history per issuer through
//! a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
