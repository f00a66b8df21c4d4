//! Book model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::BookAuthor;
use crate::error::{AppError, AppResult};

static ISBN_10: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9}[\dX]$").unwrap());
static ISBN_13: Lazy<Regex> = Lazy::new(|| Regex::new(r"^97[89]\d{10}$").unwrap());

/// Book from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub publisher_id: Option<i32>,
    pub publication_year: Option<i32>,
    pub page_count: i32,
    pub illustration_count: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Authors in display order
    #[sqlx(skip)]
    pub authors: Vec<BookAuthor>,
}

impl Book {
    /// "Last First, Last First"
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| super::author::full_name(&a.last_name, &a.first_name, &a.patronymic))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Book query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive title fragment
    pub title: Option<String>,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 300, message = "Title is required"))]
    pub title: String,
    /// Author IDs in display order
    #[serde(default)]
    pub author_ids: Vec<i32>,
    pub publisher_id: Option<i32>,
    #[validate(range(min = 1000, max = 2100, message = "Publication year must be between 1000 and 2100"))]
    pub publication_year: Option<i32>,
    #[validate(range(min = 1, message = "Page count must be at least 1"))]
    pub page_count: Option<i32>,
    #[validate(range(min = 0, message = "Illustration count cannot be negative"))]
    pub illustration_count: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub isbn: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 300, message = "Title cannot be empty"))]
    pub title: Option<String>,
    /// Replaces the author list when present
    pub author_ids: Option<Vec<i32>>,
    pub publisher_id: Option<i32>,
    #[validate(range(min = 1000, max = 2100, message = "Publication year must be between 1000 and 2100"))]
    pub publication_year: Option<i32>,
    #[validate(range(min = 1, message = "Page count must be at least 1"))]
    pub page_count: Option<i32>,
    #[validate(range(min = 0, message = "Illustration count cannot be negative"))]
    pub illustration_count: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub isbn: Option<String>,
}

/// Strip separators from an ISBN and check its shape
pub fn normalize_isbn(raw: &str) -> AppResult<String> {
    let isbn: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if ISBN_10.is_match(&isbn) || ISBN_13.is_match(&isbn) {
        Ok(isbn)
    } else {
        Err(AppError::Validation(format!("Invalid ISBN: {}", raw)))
    }
}

pub fn check_price(price: Option<Decimal>) -> AppResult<()> {
    match price {
        Some(p) if p < Decimal::ZERO => {
            Err(AppError::Validation("Price cannot be negative".to_string()))
        }
        _ => Ok(()),
    }
}

/// Rejects author lists naming the same author twice
pub fn check_author_ids(ids: &[i32]) -> AppResult<()> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(AppError::Validation(format!("Author {} listed twice", id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(normalize_isbn("978-5-17-090335-2").unwrap(), "9785170903352");
        assert_eq!(normalize_isbn("0 306 40615 x").unwrap(), "030640615X");
        assert!(normalize_isbn("12345").is_err());
        assert!(normalize_isbn("977-5-17-090335-2").is_err());
    }

    #[test]
    fn test_check_price() {
        assert!(check_price(None).is_ok());
        assert!(check_price(Some(Decimal::new(75000, 2))).is_ok());
        assert!(check_price(Some(Decimal::ZERO)).is_ok());
        assert!(check_price(Some(Decimal::new(-1, 2))).is_err());
    }

    #[test]
    fn test_check_author_ids() {
        assert!(check_author_ids(&[1, 2, 3]).is_ok());
        assert!(check_author_ids(&[1, 2, 1]).is_err());
    }

    #[test]
    fn test_create_book_validation() {
        let mut book = CreateBook {
            title: "War and Peace".to_string(),
            author_ids: vec![1],
            publisher_id: None,
            publication_year: Some(1869),
            page_count: Some(1225),
            illustration_count: None,
            price: None,
            isbn: None,
        };
        assert!(book.validate().is_ok());

        book.publication_year = Some(999);
        assert!(book.validate().is_err());

        book.publication_year = None;
        book.page_count = Some(0);
        assert!(book.validate().is_err());

        book.page_count = Some(10);
        book.title = String::new();
        assert!(book.validate().is_err());
    }

    #[test]
    fn test_author_names() {
        let now = Utc::now();
        let book = Book {
            id: 1,
            title: "Twelve Chairs".to_string(),
            publisher_id: None,
            publication_year: Some(1928),
            page_count: 400,
            illustration_count: 0,
            price: Decimal::ZERO,
            isbn: None,
            created_at: now,
            updated_at: now,
            authors: vec![
                BookAuthor {
                    id: 1,
                    first_name: "Ilya".to_string(),
                    last_name: "Ilf".to_string(),
                    patronymic: String::new(),
                    position: 0,
                },
                BookAuthor {
                    id: 2,
                    first_name: "Yevgeny".to_string(),
                    last_name: "Petrov".to_string(),
                    patronymic: String::new(),
                    position: 1,
                },
            ],
        };
        assert_eq!(book.author_names(), "Ilf Ilya, Petrov Yevgeny");
    }
}
