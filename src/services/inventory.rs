//! Inventory ledger service

use crate::{
    error::{AppError, AppResult},
    models::inventory::{BookStock, BranchStock, InventoryRecord, StockCounts},
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Total and available copies of a pair, zeros when the book is not stocked there
    pub async fn counts(&self, book_id: i32, branch_id: i32) -> AppResult<StockCounts> {
        tracing::debug!("Stock counts lookup: book={} branch={}", book_id, branch_id);
        self.repository.inventory.counts(book_id, branch_id).await
    }

    pub async fn get_record(&self, book_id: i32, branch_id: i32) -> AppResult<InventoryRecord> {
        self.repository.inventory.get(book_id, branch_id).await
    }

    /// Add (`delta > 0`) or remove (`delta < 0`) copies of a book at a branch
    pub async fn adjust(&self, book_id: i32, branch_id: i32, delta: i32) -> AppResult<InventoryRecord> {
        if delta == 0 {
            return Err(AppError::Validation("Delta cannot be zero".to_string()));
        }
        self.ensure_pair_exists(book_id, branch_id).await?;

        match self.repository.inventory.adjust(book_id, branch_id, delta).await {
            Ok(record) => {
                tracing::info!(
                    "Inventory adjusted: book={} branch={} delta={} total={} available={}",
                    book_id, branch_id, delta, record.total_copies, record.available_copies
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    "Inventory adjustment rejected: book={} branch={} delta={}: {}",
                    book_id, branch_id, delta, e
                );
                Err(e)
            }
        }
    }

    pub async fn set_shelf_location(
        &self,
        book_id: i32,
        branch_id: i32,
        shelf_location: Option<String>,
    ) -> AppResult<InventoryRecord> {
        let location = shelf_location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self.repository
            .inventory
            .set_shelf_location(book_id, branch_id, location.as_deref())
            .await
    }

    /// Books with copies on the shelf at a branch
    pub async fn list_for_branch(&self, branch_id: i32) -> AppResult<Vec<BranchStock>> {
        self.repository.branches.get_by_id(branch_id).await?;
        self.repository.inventory.list_available_in_branch(branch_id).await
    }

    /// Stock of a book in every branch holding it
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookStock>> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        self.repository.inventory.list_for_book(book_id).await
    }

    async fn ensure_pair_exists(&self, book_id: i32, branch_id: i32) -> AppResult<()> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        if !self.repository.branches.exists(branch_id).await? {
            return Err(AppError::NotFound(format!("Branch with id {} not found", branch_id)));
        }
        Ok(())
    }
}
