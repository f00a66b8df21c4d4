//! Faculty and faculty book usage models

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

static ACADEMIC_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Faculty {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFaculty {
    #[validate(length(min = 1, max = 255, message = "Faculty name is required"))]
    pub name: String,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFaculty {
    #[validate(length(min = 1, max = 255, message = "Faculty name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    pub description: Option<String>,
}

/// A faculty using a book at a branch
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FacultyUsage {
    pub id: i32,
    pub book_id: i32,
    pub faculty_id: i32,
    pub branch_id: i32,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub semester: Option<String>,
    /// "YYYY-YYYY"
    pub academic_year: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUsage {
    pub book_id: i32,
    pub faculty_id: i32,
    pub branch_id: i32,
    #[validate(length(max = 50))]
    pub course_code: Option<String>,
    #[validate(length(max = 255))]
    pub course_name: Option<String>,
    #[validate(length(max = 50))]
    pub semester: Option<String>,
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: Option<String>,
}

/// Faculties using a book at a branch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FacultiesForBook {
    pub book_id: i32,
    pub branch_id: i32,
    pub count: i64,
    pub faculties: Vec<Faculty>,
}

/// Consecutive years, e.g. "2024-2025"
pub fn validate_academic_year(value: &str) -> Result<(), ValidationError> {
    let caps = ACADEMIC_YEAR
        .captures(value)
        .ok_or_else(|| ValidationError::new("academic_year_format"))?;
    let start: i32 = caps[1].parse().map_err(|_| ValidationError::new("academic_year_format"))?;
    let end: i32 = caps[2].parse().map_err(|_| ValidationError::new("academic_year_format"))?;
    if end == start + 1 {
        Ok(())
    } else {
        Err(ValidationError::new("academic_year_range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_academic_year() {
        assert!(validate_academic_year("2024-2025").is_ok());
        assert!(validate_academic_year("2024-2026").is_err());
        assert!(validate_academic_year("24-25").is_err());
        assert!(validate_academic_year("2024/2025").is_err());
    }

    #[test]
    fn test_register_usage_validation() {
        let usage = RegisterUsage {
            book_id: 1,
            faculty_id: 2,
            branch_id: 3,
            course_code: Some("MATH101".to_string()),
            course_name: None,
            semester: None,
            academic_year: Some("2025-2024".to_string()),
        };
        assert!(usage.validate().is_err());
    }
}
