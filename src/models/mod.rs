//! Data models for Bibliotheca

pub mod author;
pub mod book;
pub mod branch;
pub mod faculty;
pub mod inventory;
pub mod loan;
pub mod student;
pub mod user;

// Re-export commonly used types
pub use author::{Author, Publisher};
pub use book::Book;
pub use branch::Branch;
pub use faculty::{Faculty, FacultyUsage};
pub use inventory::InventoryRecord;
pub use loan::{Loan, LoanStatus, LoanView};
pub use student::Student;
pub use user::UserClaims;

const MAX_PER_PAGE: i64 = 200;
const MAX_PAGE: i64 = 1_000_000;

/// Page number and size from optional query values.
///
/// Both are clamped so that `(page - 1) * per_page` always fits an OFFSET.
pub fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let per_page = per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE);
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    (page, per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None), (1, 20));
        assert_eq!(page_bounds(Some(0), Some(1000)), (1, 200));
        assert_eq!(page_bounds(Some(3), Some(50)), (3, 50));
        assert_eq!(page_bounds(Some(-7), Some(-1)), (1, 1));
    }

    #[test]
    fn test_page_bounds_huge_page() {
        let (page, per_page) = page_bounds(Some(i64::MAX), Some(200));
        assert_eq!(page, MAX_PAGE);
        let offset = (page - 1).checked_mul(per_page);
        assert_eq!(offset, Some((MAX_PAGE - 1) * 200));
    }
}
