//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookFilter, CreateBook},
};

use super::BookStore;

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn select(filter: &BookFilter) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new("SELECT id, name, category, rent FROM books WHERE TRUE");

        if let Some(ref name) = filter.name_contains {
            query
                .push(" AND strpos(lower(name), lower(")
                .push_bind(name.clone())
                .push(")) > 0");
        }
        if let Some(ref name) = filter.name_exact {
            query.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(ref category) = filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(lower) = filter.rent_above {
            query.push(" AND rent > ").push_bind(lower);
        }
        if let Some(higher) = filter.rent_below {
            query.push(" AND rent < ").push_bind(higher);
        }

        query.push(" ORDER BY seq");
        query
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn insert(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (name, category, rent)
            VALUES ($1, $2, $3)
            RETURNING id, name, category, rent
            "#,
        )
        .bind(&book.name)
        .bind(&book.category)
        .bind(book.rent)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Book>> {
        let book =
            sqlx::query_as::<_, Book>("SELECT id, name, category, rent FROM books WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(book)
    }

    async fn find(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let books = Self::select(filter)
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    async fn find_first(&self, filter: &BookFilter) -> AppResult<Option<Book>> {
        let mut query = Self::select(filter);
        query.push(" LIMIT 1");

        let book = query
            .build_query_as::<Book>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
