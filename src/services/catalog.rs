//! Catalog service: book lookup and administration

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, CreateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Resolve a human-supplied name to a book.
    ///
    /// Case-insensitive substring match; when several books match, the first
    /// one in store insertion order wins.
    pub async fn resolve_book(&self, name_query: &str) -> AppResult<Book> {
        self.repository
            .books
            .find_first(&BookFilter::name_contains(name_query))
            .await?
            .ok_or_else(|| AppError::BookNotFound(name_query.to_string()))
    }

    /// Resolve a book by its exact, case-sensitive name
    pub async fn resolve_book_exact(&self, name: &str) -> AppResult<Book> {
        self.repository
            .books
            .find_first(&BookFilter::name_exact(name))
            .await?
            .ok_or_else(|| AppError::BookNotFound(name.to_string()))
    }

    /// Search books with filters
    pub async fn search_books(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        self.repository.books.find(filter).await
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.books.insert(&book).await?;
        tracing::info!(book = %created.id, name = %created.name, "Book added to catalog");
        Ok(created)
    }

    /// Remove the book with exactly this name.
    ///
    /// Ledger records referencing it are kept.
    pub async fn delete_book(&self, name: &str) -> AppResult<Book> {
        let book = self.resolve_book_exact(name).await?;
        if !self.repository.books.delete(book.id).await? {
            return Err(AppError::BookNotFound(name.to_string()));
        }
        tracing::info!(book = %book.id, name = %book.name, "Book removed from catalog");
        Ok(book)
    }
}
