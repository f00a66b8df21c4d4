//! Loan model and lifecycle transitions.
//!
//! A loan is either active or returned; deletion is the other way out of the
//! active state. "Overdue" is only a label computed from the dates at read time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{InventoryError, LoanError};

use super::inventory::InventoryRecord;

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub student_id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    /// Staff user who issued the loan
    pub issued_by: Option<i32>,
    pub notes: Option<String>,
}

/// Display status derived from the loan dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        if !self.is_active() {
            LoanStatus::Returned
        } else if now > self.due_date {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    /// Whole days past the due date, 0 unless overdue
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        match self.status(now) {
            LoanStatus::Overdue => (now - self.due_date).num_days(),
            _ => 0,
        }
    }

    /// The returned state of this loan
    pub fn returned(&self, now: DateTime<Utc>) -> Result<Loan, LoanError> {
        if !self.is_active() {
            return Err(LoanError::AlreadyReturned);
        }
        let mut next = self.clone();
        // Clock skew between app and database must not put the return before the issue
        next.return_date = Some(now.max(self.issue_date));
        next.is_returned = true;
        Ok(next)
    }

    pub fn with_status(self, now: DateTime<Utc>) -> LoanView {
        LoanView {
            status: self.status(now),
            days_overdue: self.days_overdue(now),
            loan: self,
        }
    }
}

/// Checks a new loan against current stock and the student's active loans.
///
/// `stock` is the locked inventory row for the (book, branch) pair, `None` when the
/// book is not stocked there. Returns the row to write back on success.
pub fn check_issue(
    stock: Option<&InventoryRecord>,
    has_active_loan_for_book: bool,
) -> Result<InventoryRecord, IssueRejection> {
    let stock = match stock {
        Some(record) if record.is_available() => record,
        _ => return Err(IssueRejection::Inventory(InventoryError::NoAvailableCopies)),
    };
    if has_active_loan_for_book {
        return Err(IssueRejection::Loan(LoanError::DuplicateActiveLoan));
    }
    let next = stock.with_loan_issued().map_err(IssueRejection::Inventory)?;
    next.validate().map_err(IssueRejection::Inventory)?;
    Ok(next)
}

/// Why a loan could not be issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueRejection {
    Inventory(InventoryError),
    Loan(LoanError),
}

impl From<IssueRejection> for crate::error::AppError {
    fn from(rejection: IssueRejection) -> Self {
        match rejection {
            IssueRejection::Inventory(e) => e.into(),
            IssueRejection::Loan(e) => e.into(),
        }
    }
}

/// Due date for a loan issued at `issue_date`
pub fn due_date_for(issue_date: DateTime<Utc>, duration_days: i64) -> DateTime<Utc> {
    issue_date + Duration::days(duration_days)
}

/// Loan with its derived status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub status: LoanStatus,
    pub days_overdue: i64,
}

/// Issue loan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IssueLoan {
    pub student_id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    /// Loan duration in days (default from configuration)
    pub duration_days: Option<i64>,
    pub notes: Option<String>,
}

/// Loan list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub student_id: Option<i32>,
    pub book_id: Option<i32>,
    pub branch_id: Option<i32>,
    /// Only loans that are not returned yet
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::tests::record;

    fn loan(issued: DateTime<Utc>) -> Loan {
        Loan {
            id: 1,
            student_id: 5,
            book_id: 10,
            branch_id: 20,
            issue_date: issued,
            due_date: due_date_for(issued, 14),
            return_date: None,
            is_returned: false,
            issued_by: Some(3),
            notes: None,
        }
    }

    #[test]
    fn test_status_is_derived_from_dates() {
        let issued = Utc::now() - Duration::days(20);
        let l = loan(issued);
        assert_eq!(l.status(issued + Duration::days(1)), LoanStatus::Active);
        assert_eq!(l.status(issued + Duration::days(16)), LoanStatus::Overdue);
        assert_eq!(l.days_overdue(issued + Duration::days(16)), 2);

        let returned = l.returned(issued + Duration::days(15)).unwrap();
        assert_eq!(returned.status(issued + Duration::days(30)), LoanStatus::Returned);
        assert_eq!(returned.days_overdue(issued + Duration::days(30)), 0);
    }

    #[test]
    fn test_return_twice_fails() {
        let issued = Utc::now();
        let l = loan(issued).returned(issued).unwrap();
        assert!(l.is_returned);
        assert_eq!(l.returned(issued), Err(LoanError::AlreadyReturned));
    }

    #[test]
    fn test_return_date_not_before_issue() {
        let issued = Utc::now();
        let l = loan(issued).returned(issued - Duration::minutes(5)).unwrap();
        assert_eq!(l.return_date, Some(issued));
    }

    #[test]
    fn test_issue_without_stock() {
        assert_eq!(
            check_issue(None, false),
            Err(IssueRejection::Inventory(InventoryError::NoAvailableCopies))
        );
        assert_eq!(
            check_issue(Some(&record(5, 0)), false),
            Err(IssueRejection::Inventory(InventoryError::NoAvailableCopies))
        );
    }

    #[test]
    fn test_issue_duplicate_active_loan() {
        assert_eq!(
            check_issue(Some(&record(10, 9)), true),
            Err(IssueRejection::Loan(LoanError::DuplicateActiveLoan))
        );
    }

    #[test]
    fn test_issue_decrements_by_one() {
        let next = check_issue(Some(&record(10, 10)), false).unwrap();
        assert_eq!((next.total_copies, next.available_copies), (10, 9));
    }

    #[test]
    fn test_issue_reject_return_scenario() {
        // (10, 10) -> issue -> 9 -> same student/book again -> rejected -> return -> 10
        let stock = record(10, 10);
        let now = Utc::now();

        let stock = check_issue(Some(&stock), false).unwrap();
        let first = loan(now);
        assert_eq!(stock.available_copies, 9);

        let rejected = check_issue(Some(&stock), first.is_active());
        assert!(matches!(rejected, Err(IssueRejection::Loan(LoanError::DuplicateActiveLoan))));
        assert_eq!(stock.available_copies, 9);

        let first = first.returned(now).unwrap();
        let stock = stock.with_loan_restored().unwrap();
        assert!(stock.validate().is_ok());
        assert_eq!(stock.available_copies, 10);
        assert!(!first.is_active());
    }

    #[test]
    fn test_view_flattens_loan() {
        let now = Utc::now();
        let view = loan(now).with_status(now);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["book_id"], 10);
        assert_eq!(json["days_overdue"], 0);
    }
}
