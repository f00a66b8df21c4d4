//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use super::inventory;
use crate::{
    error::{is_unique_violation, map_constraint_error, AppResult, InventoryError, LoanError},
    models::{
        loan::{check_issue, Loan, LoanQuery},
        page_bounds,
    },
};

const ONE_ACTIVE_LOAN_INDEX: &str = "idx_loans_one_active_per_student_book";

/// Values of a loan about to be written
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub student_id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub issued_by: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

async fn lock_loan(conn: &mut PgConnection, id: i32) -> AppResult<Loan> {
    let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(LoanError::NotFound(id))?;
    Ok(loan)
}

/// Put one copy back on the shelf for an active loan leaving the active state
async fn restore_copy(conn: &mut PgConnection, loan: &Loan) -> AppResult<()> {
    let record = inventory::lock(conn, loan.book_id, loan.branch_id)
        .await?
        .ok_or(InventoryError::RecordMissing {
            book_id: loan.book_id,
            branch_id: loan.branch_id,
        })?;
    inventory::store(conn, &record.with_loan_restored()?).await?;
    Ok(())
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LoanError::NotFound(id))?;
        Ok(loan)
    }

    /// List loans, newest first
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<Loan>, i64)> {
        let (page, per_page) = page_bounds(query.page, query.per_page);
        let offset = (page - 1) * per_page;
        let active_only = query.active.unwrap_or(false);

        const FILTER: &str = r#"
            WHERE ($1::int IS NULL OR student_id = $1)
              AND ($2::int IS NULL OR book_id = $2)
              AND ($3::int IS NULL OR branch_id = $3)
              AND (NOT $4 OR return_date IS NULL)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM loans {}", FILTER))
            .bind(query.student_id)
            .bind(query.book_id)
            .bind(query.branch_id)
            .bind(active_only)
            .fetch_one(&self.pool)
            .await?;

        let loans = sqlx::query_as::<_, Loan>(&format!(
            "SELECT * FROM loans {} ORDER BY issue_date DESC, id DESC LIMIT $5 OFFSET $6",
            FILTER
        ))
        .bind(query.student_id)
        .bind(query.book_id)
        .bind(query.branch_id)
        .bind(active_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((loans, total))
    }

    /// Active loans past their due date
    pub async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE return_date IS NULL AND due_date < $1 ORDER BY due_date",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Number of distinct students who ever borrowed a book
    pub async fn count_distinct_students(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT student_id) FROM loans WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Create a loan and take one copy out of stock, atomically
    pub async fn issue(&self, new_loan: &NewLoan) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let stock = inventory::lock(&mut tx, new_loan.book_id, new_loan.branch_id).await?;

        let has_active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE student_id = $1 AND book_id = $2 AND return_date IS NULL
            )
            "#,
        )
        .bind(new_loan.student_id)
        .bind(new_loan.book_id)
        .fetch_one(&mut *tx)
        .await?;

        let next_stock = check_issue(stock.as_ref(), has_active)?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (student_id, book_id, branch_id, issue_date, due_date,
                               is_returned, issued_by, notes)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new_loan.student_id)
        .bind(new_loan.book_id)
        .bind(new_loan.branch_id)
        .bind(new_loan.issue_date)
        .bind(new_loan.due_date)
        .bind(new_loan.issued_by)
        .bind(&new_loan.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, ONE_ACTIVE_LOAN_INDEX) {
                LoanError::DuplicateActiveLoan.into()
            } else {
                map_constraint_error(e, "Loan")
            }
        })?;

        inventory::store(&mut tx, &next_stock).await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Mark a loan returned and put the copy back in stock, atomically
    pub async fn return_loan(&self, id: i32, now: DateTime<Utc>) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = lock_loan(&mut tx, id).await?;
        let returned = loan.returned(now)?;

        restore_copy(&mut tx, &loan).await?;

        let stored = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET return_date = $1, is_returned = $2 WHERE id = $3 RETURNING *",
        )
        .bind(returned.return_date)
        .bind(returned.is_returned)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Remove a loan; an active loan gives its copy back first
    pub async fn delete(&self, id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = lock_loan(&mut tx, id).await?;
        if loan.is_active() {
            restore_copy(&mut tx, &loan).await?;
        }

        sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }
}
