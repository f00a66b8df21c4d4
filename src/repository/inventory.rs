//! Inventory ledger persistence.
//!
//! Counter writes go through [`lock`] and [`store`] inside a transaction: the row is
//! read `FOR UPDATE`, a pure transition from [`crate::models::inventory`] computes the
//! next state, and [`store`] runs the validation gate before writing it.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{map_constraint_error, AppError, AppResult},
    models::inventory::{BookStock, BranchStock, InventoryRecord, StockCounts},
};

/// Lock the stock row of a pair for the rest of the transaction
pub(crate) async fn lock(
    conn: &mut PgConnection,
    book_id: i32,
    branch_id: i32,
) -> AppResult<Option<InventoryRecord>> {
    let record = sqlx::query_as::<_, InventoryRecord>(
        "SELECT * FROM book_inventories WHERE book_id = $1 AND branch_id = $2 FOR UPDATE",
    )
    .bind(book_id)
    .bind(branch_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(record)
}

/// Write the counters of a locked row after the validation gate
pub(crate) async fn store(
    conn: &mut PgConnection,
    record: &InventoryRecord,
) -> AppResult<InventoryRecord> {
    record.validate()?;

    let stored = sqlx::query_as::<_, InventoryRecord>(
        r#"
        UPDATE book_inventories
        SET total_copies = $1, available_copies = $2, shelf_location = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(record.total_copies)
    .bind(record.available_copies)
    .bind(&record.shelf_location)
    .bind(record.id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(stored)
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Postgres>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Total and available copies of a pair (zeros when absent)
    pub async fn counts(&self, book_id: i32, branch_id: i32) -> AppResult<StockCounts> {
        let (total_copies, available_copies) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(total_copies), 0)::bigint,
                   COALESCE(SUM(available_copies), 0)::bigint
            FROM book_inventories
            WHERE book_id = $1 AND branch_id = $2
            "#,
        )
        .bind(book_id)
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(StockCounts {
            book_id,
            branch_id,
            total_copies,
            available_copies,
        })
    }

    /// Stock row of a pair
    pub async fn get(&self, book_id: i32, branch_id: i32) -> AppResult<InventoryRecord> {
        sqlx::query_as::<_, InventoryRecord>(
            "SELECT * FROM book_inventories WHERE book_id = $1 AND branch_id = $2",
        )
        .bind(book_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Book {} is not stocked at branch {}",
                book_id, branch_id
            ))
        })
    }

    /// Add or remove copies, creating the row on first stocking
    pub async fn adjust(&self, book_id: i32, branch_id: i32, delta: i32) -> AppResult<InventoryRecord> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO book_inventories (book_id, branch_id, total_copies, available_copies)
            VALUES ($1, $2, 0, 0)
            ON CONFLICT (book_id, branch_id) DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(branch_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_constraint_error(e, "Inventory record"))?;

        let current = lock(&mut tx, book_id, branch_id)
            .await?
            .ok_or_else(|| AppError::Internal("Inventory row vanished inside transaction".to_string()))?;

        let next = current.adjusted(delta)?;
        let stored = store(&mut tx, &next).await?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Set the shelf location of an existing row
    pub async fn set_shelf_location(
        &self,
        book_id: i32,
        branch_id: i32,
        shelf_location: Option<&str>,
    ) -> AppResult<InventoryRecord> {
        let mut tx = self.pool.begin().await?;

        let mut record = lock(&mut tx, book_id, branch_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "Book {} is not stocked at branch {}",
                book_id, branch_id
            ))
        })?;
        record.shelf_location = shelf_location.map(str::to_string);
        let stored = store(&mut tx, &record).await?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Books with at least one available copy at a branch
    pub async fn list_available_in_branch(&self, branch_id: i32) -> AppResult<Vec<BranchStock>> {
        let rows = sqlx::query_as::<_, BranchStock>(
            r#"
            SELECT inv.book_id, b.title, inv.total_copies, inv.available_copies, inv.shelf_location
            FROM book_inventories inv
            JOIN books b ON b.id = inv.book_id
            WHERE inv.branch_id = $1 AND inv.available_copies > 0
            ORDER BY b.title
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Stock of one book across branches
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookStock>> {
        let rows = sqlx::query_as::<_, BookStock>(
            r#"
            SELECT inv.branch_id, br.name AS branch_name, inv.total_copies,
                   inv.available_copies, inv.shelf_location
            FROM book_inventories inv
            JOIN branches br ON br.id = inv.branch_id
            WHERE inv.book_id = $1
            ORDER BY br.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
