//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Book model from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Rent charged per day of lending
    pub rent: i64,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    /// Per-day rent, at most 1_000_000_000 so that a return's rent always fits in an i64
    #[validate(range(
        min = 0,
        max = 1_000_000_000,
        message = "rent must be between 0 and 1000000000"
    ))]
    pub rent: i64,
}

/// Catalog search query
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Exclusive lower bound on rent
    pub lower: Option<i64>,
    /// Exclusive upper bound on rent
    pub higher: Option<i64>,
}

/// Filter over the books collection.
///
/// Every populated field must match; an empty filter matches all books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub name_contains: Option<String>,
    pub name_exact: Option<String>,
    pub category: Option<String>,
    pub rent_above: Option<i64>,
    pub rent_below: Option<i64>,
}

impl BookFilter {
    pub fn name_contains(query: impl Into<String>) -> Self {
        Self {
            name_contains: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn name_exact(name: impl Into<String>) -> Self {
        Self {
            name_exact: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(ref query) = self.name_contains {
            if !contains_ignore_case(&book.name, query) {
                return false;
            }
        }
        if let Some(ref name) = self.name_exact {
            if &book.name != name {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if &book.category != category {
                return false;
            }
        }
        if let Some(lower) = self.rent_above {
            if book.rent <= lower {
                return false;
            }
        }
        if let Some(higher) = self.rent_below {
            if book.rent >= higher {
                return false;
            }
        }
        true
    }
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        Self {
            name_contains: query.name.filter(|n| !n.is_empty()),
            name_exact: None,
            category: query.category.filter(|c| !c.is_empty()),
            rent_above: query.lower,
            rent_below: query.higher,
        }
    }
}

/// Case-insensitive substring test used for name and issuer lookups
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
