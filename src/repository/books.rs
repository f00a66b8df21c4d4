//! Books repository

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{map_constraint_error, AppError, AppResult},
    models::{
        author::BookAuthor,
        book::{Book, BookQuery, CreateBook, UpdateBook},
        page_bounds,
    },
};

#[derive(sqlx::FromRow)]
struct AuthorRow {
    book_id: i32,
    #[sqlx(flatten)]
    author: BookAuthor,
}

/// Replace the author list of a book, keeping the given order
async fn write_authors(conn: &mut PgConnection, book_id: i32, author_ids: &[i32]) -> AppResult<()> {
    sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    if author_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO book_authors (book_id, author_id, position)
        SELECT $1, ids.author_id, (ids.ord - 1)::smallint
        FROM UNNEST($2::int[]) WITH ORDINALITY AS ids(author_id, ord)
        "#,
    )
    .bind(book_id)
    .bind(author_ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_constraint_error(e, "Book author"))?;
    Ok(())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Attach ordered authors to loaded books
    async fn load_authors(&self, books: &mut [Book]) -> AppResult<()> {
        if books.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();

        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT ba.book_id, a.id, a.first_name, a.last_name, a.patronymic, ba.position
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = ANY($1)
            ORDER BY ba.book_id, ba.position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_book: HashMap<i32, Vec<BookAuthor>> = HashMap::new();
        for row in rows {
            by_book.entry(row.book_id).or_default().push(row.author);
        }
        for book in books.iter_mut() {
            book.authors = by_book.remove(&book.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Get book by ID, with authors
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let mut books = vec![book];
        self.load_authors(&mut books).await?;
        Ok(books.remove(0))
    }

    /// Check that a book exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let (page, per_page) = page_bounds(query.page, query.per_page);
        let offset = (page - 1) * per_page;
        let title = query.title.as_ref().map(|t| format!("%{}%", t));

        const FILTER: &str = r#"
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
              AND ($2::int IS NULL OR EXISTS(
                    SELECT 1 FROM book_authors ba WHERE ba.book_id = b.id AND ba.author_id = $2))
              AND ($3::int IS NULL OR b.publisher_id = $3)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books b {}", FILTER))
            .bind(&title)
            .bind(query.author_id)
            .bind(query.publisher_id)
            .fetch_one(&self.pool)
            .await?;

        let mut books = sqlx::query_as::<_, Book>(&format!(
            "SELECT b.* FROM books b {} ORDER BY b.title, b.id LIMIT $4 OFFSET $5",
            FILTER
        ))
        .bind(&title)
        .bind(query.author_id)
        .bind(query.publisher_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.load_authors(&mut books).await?;
        Ok((books, total))
    }

    /// Create a book and its author links
    pub async fn create(&self, data: &CreateBook, isbn: Option<&str>) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, publisher_id, publication_year, page_count,
                               illustration_count, price, isbn)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.publisher_id)
        .bind(data.publication_year)
        .bind(data.page_count.unwrap_or(1))
        .bind(data.illustration_count.unwrap_or(0))
        .bind(data.price.unwrap_or(Decimal::ZERO))
        .bind(isbn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, "Book"))?;

        write_authors(&mut tx, book.id, &data.author_ids).await?;
        tx.commit().await?;

        self.get_by_id(book.id).await
    }

    /// Update a book; a present author list replaces the old one
    pub async fn update(&self, id: i32, data: &UpdateBook, isbn: Option<&str>) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.publisher_id, "publisher_id");
        add_field!(data.publication_year, "publication_year");
        add_field!(data.page_count, "page_count");
        add_field!(data.illustration_count, "illustration_count");
        add_field!(data.price, "price");
        add_field!(isbn, "isbn");

        let query = format!(
            "UPDATE books SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );
        let mut builder = sqlx::query_as::<_, Book>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.publisher_id);
        bind_field!(data.publication_year);
        bind_field!(data.page_count);
        bind_field!(data.illustration_count);
        bind_field!(data.price);
        bind_field!(isbn);

        builder
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_constraint_error(e, "Book"))?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(ref author_ids) = data.author_ids {
            write_authors(&mut tx, id, author_ids).await?;
        }
        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Delete book; stock, usages and loans go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
