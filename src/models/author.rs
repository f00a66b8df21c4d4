//! Author and publisher models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Empty when the author has none
    pub patronymic: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// "Last First [Patronymic]"
    pub fn full_name(&self) -> String {
        full_name(&self.last_name, &self.first_name, &self.patronymic)
    }
}

pub fn full_name(last_name: &str, first_name: &str, patronymic: &str) -> String {
    if patronymic.is_empty() {
        format!("{} {}", last_name, first_name)
    } else {
        format!("{} {} {}", last_name, first_name, patronymic)
    }
}

/// Author reference inside a book, in display order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookAuthor {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub position: i16,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(max = 100))]
    pub patronymic: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(length(max = 100))]
    pub patronymic: Option<String>,
    pub bio: Option<String>,
}

/// Publisher from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePublisher {
    #[validate(length(min = 1, max = 255, message = "Publisher name is required"))]
    pub name: String,
    pub address: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePublisher {
    #[validate(length(min = 1, max = 255, message = "Publisher name cannot be empty"))]
    pub name: Option<String>,
    pub address: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("Tolstoy", "Leo", ""), "Tolstoy Leo");
        assert_eq!(
            full_name("Dostoevsky", "Fyodor", "Mikhailovich"),
            "Dostoevsky Fyodor Mikhailovich"
        );
    }

    #[test]
    fn test_create_author_requires_names() {
        let author = CreateAuthor {
            first_name: String::new(),
            last_name: "Tolstoy".to_string(),
            patronymic: None,
            bio: None,
        };
        assert!(author.validate().is_err());
    }

    #[test]
    fn test_publisher_email() {
        let publisher = CreatePublisher {
            name: "Nauka".to_string(),
            address: None,
            website: Some("https://nauka.example.org".to_string()),
            email: Some("not-an-email".to_string()),
            phone: None,
        };
        assert!(publisher.validate().is_err());
    }
}
