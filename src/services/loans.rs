//! Loan management service

use chrono::Utc;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{due_date_for, IssueLoan, LoanQuery, LoanView},
    repository::{loans::NewLoan, Repository},
};

/// Loan duration for a request, bounded by configuration
fn resolve_duration(requested: Option<i64>, config: &LoansConfig) -> AppResult<i64> {
    let days = requested.unwrap_or(config.default_duration_days);
    if days < 1 || days > config.max_duration_days {
        return Err(AppError::Validation(format!(
            "Loan duration must be between 1 and {} days",
            config.max_duration_days
        )));
    }
    Ok(days)
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Issue a copy of a book at a branch to a student
    pub async fn issue(&self, request: IssueLoan, issued_by: Option<i32>) -> AppResult<LoanView> {
        let days = resolve_duration(request.duration_days, &self.config)?;

        // Verify student exists
        self.repository.students.get_by_id(request.student_id).await?;

        let now = Utc::now();
        let new_loan = NewLoan {
            student_id: request.student_id,
            book_id: request.book_id,
            branch_id: request.branch_id,
            issue_date: now,
            due_date: due_date_for(now, days),
            issued_by,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };

        match self.repository.loans.issue(&new_loan).await {
            Ok(loan) => {
                tracing::info!(
                    "Loan {} issued: student={} book={} branch={} due={}",
                    loan.id, loan.student_id, loan.book_id, loan.branch_id, loan.due_date
                );
                Ok(loan.with_status(now))
            }
            Err(e) => {
                tracing::warn!(
                    "Loan refused: student={} book={} branch={}: {}",
                    new_loan.student_id, new_loan.book_id, new_loan.branch_id, e
                );
                Err(e)
            }
        }
    }

    /// Return a loan
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<LoanView> {
        let now = Utc::now();
        let loan = self.repository.loans.return_loan(loan_id, now).await?;
        tracing::info!("Loan {} returned: book={} branch={}", loan.id, loan.book_id, loan.branch_id);
        Ok(loan.with_status(now))
    }

    /// Delete a loan, restoring stock when it was still active
    pub async fn delete(&self, loan_id: i32) -> AppResult<()> {
        let loan = self.repository.loans.delete(loan_id).await?;
        tracing::info!(
            "Loan {} deleted (was {}): book={} branch={}",
            loan.id,
            if loan.is_active() { "active" } else { "returned" },
            loan.book_id,
            loan.branch_id
        );
        Ok(())
    }

    pub async fn get(&self, loan_id: i32) -> AppResult<LoanView> {
        tracing::debug!("Loan lookup: id={}", loan_id);
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        Ok(loan.with_status(Utc::now()))
    }

    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanView>, i64)> {
        let now = Utc::now();
        let (loans, total) = self.repository.loans.list(query).await?;
        Ok((loans.into_iter().map(|l| l.with_status(now)).collect(), total))
    }

    pub async fn list_overdue(&self) -> AppResult<Vec<LoanView>> {
        let now = Utc::now();
        let loans = self.repository.loans.list_overdue(now).await?;
        Ok(loans.into_iter().map(|l| l.with_status(now)).collect())
    }

    /// Distinct students who ever borrowed a book
    pub async fn count_distinct_students_for_book(&self, book_id: i32) -> AppResult<i64> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        self.repository.loans.count_distinct_students(book_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_duration() {
        let config = LoansConfig::default();
        assert_eq!(resolve_duration(None, &config).unwrap(), 14);
        assert_eq!(resolve_duration(Some(30), &config).unwrap(), 30);
        assert_eq!(resolve_duration(Some(365), &config).unwrap(), 365);
        assert!(matches!(resolve_duration(Some(0), &config), Err(AppError::Validation(_))));
        assert!(resolve_duration(Some(366), &config).is_err());
    }
}
