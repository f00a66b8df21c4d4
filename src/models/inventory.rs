//! Per (book, branch) stock counters and the rules that keep them consistent.
//!
//! Every persisted [`InventoryRecord`] satisfies `0 <= available_copies <= total_copies`.
//! The transitions below never touch the database: repositories lock the row, call a
//! transition, run [`InventoryRecord::validate`] and write the result back in the same
//! transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::InventoryError;

/// Stock row for one book at one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryRecord {
    pub id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Validation gate run before every write of a record
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.total_copies < 0 || self.available_copies < 0 {
            return Err(InventoryError::NegativeCount);
        }
        if self.available_copies > self.total_copies {
            return Err(InventoryError::AvailableExceedsTotal {
                available: self.available_copies,
                total: self.total_copies,
            });
        }
        Ok(())
    }

    /// Copies added (`delta > 0`) or removed (`delta < 0`) from stock.
    ///
    /// New stock raises both counters. Removed stock lowers the total and clamps
    /// the available count at zero.
    pub fn adjusted(&self, delta: i32) -> Result<Self, InventoryError> {
        let overflow = |current| InventoryError::CountOverflow { current, delta };
        let mut next = self.clone();
        if delta > 0 {
            next.total_copies = self
                .total_copies
                .checked_add(delta)
                .ok_or_else(|| overflow(self.total_copies))?;
            next.available_copies = self
                .available_copies
                .checked_add(delta)
                .ok_or_else(|| overflow(self.available_copies))?;
        } else if delta < 0 {
            let total = self
                .total_copies
                .checked_add(delta)
                .ok_or_else(|| overflow(self.total_copies))?;
            if total < 0 {
                return Err(InventoryError::NegativeTotal {
                    total: self.total_copies,
                    delta,
                });
            }
            next.total_copies = total;
            next.available_copies = self.available_copies.saturating_add(delta).max(0);
        }
        Ok(next)
    }

    /// One copy handed out on a new loan
    pub fn with_loan_issued(&self) -> Result<Self, InventoryError> {
        if self.available_copies <= 0 {
            return Err(InventoryError::NoAvailableCopies);
        }
        let mut next = self.clone();
        next.available_copies -= 1;
        Ok(next)
    }

    /// One copy back on the shelf after a return or the deletion of an active loan.
    ///
    /// The increment does not look at the total; the validation gate still applies
    /// before the row is written.
    pub fn with_loan_restored(&self) -> Result<Self, InventoryError> {
        let mut next = self.clone();
        next.available_copies = self.available_copies.checked_add(1).ok_or(
            InventoryError::CountOverflow {
                current: self.available_copies,
                delta: 1,
            },
        )?;
        Ok(next)
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Total and available counts for a pair, zero when the book is not stocked there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StockCounts {
    pub book_id: i32,
    pub branch_id: i32,
    pub total_copies: i64,
    pub available_copies: i64,
}

/// (book, branch) pair in query strings
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StockQuery {
    pub book_id: i32,
    pub branch_id: i32,
}

/// Stock adjustment request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustInventory {
    pub book_id: i32,
    pub branch_id: i32,
    /// Copies added (positive) or removed (negative)
    pub delta: i32,
}

/// Shelf location update
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateShelfLocation {
    pub book_id: i32,
    pub branch_id: i32,
    pub shelf_location: Option<String>,
}

/// Stock line of a branch listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BranchStock {
    pub book_id: i32,
    pub title: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
}

/// Stock line of a book listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookStock {
    pub branch_id: i32,
    pub branch_name: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(total: i32, available: i32) -> InventoryRecord {
        let now = Utc::now();
        InventoryRecord {
            id: 1,
            book_id: 10,
            branch_id: 20,
            total_copies: total,
            available_copies: available,
            shelf_location: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate() {
        assert!(record(0, 0).validate().is_ok());
        assert!(record(5, 5).validate().is_ok());
        assert_eq!(
            record(2, 3).validate(),
            Err(InventoryError::AvailableExceedsTotal { available: 3, total: 2 })
        );
        assert_eq!(record(-1, 0).validate(), Err(InventoryError::NegativeCount));
        assert_eq!(record(1, -1).validate(), Err(InventoryError::NegativeCount));
    }

    #[test]
    fn test_restock_on_fresh_record() {
        let r = record(0, 0).adjusted(3).unwrap();
        assert_eq!((r.total_copies, r.available_copies), (3, 3));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_removal_clamps_available() {
        // 10 copies, 8 out on loan
        let r = record(10, 2).adjusted(-5).unwrap();
        assert_eq!((r.total_copies, r.available_copies), (5, 0));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_removal_below_zero_fails() {
        assert_eq!(
            record(2, 2).adjusted(-3),
            Err(InventoryError::NegativeTotal { total: 2, delta: -3 })
        );
        assert!(record(2, 2).adjusted(-2).is_ok());
    }

    #[test]
    fn test_restock_past_counter_range_fails() {
        assert_eq!(
            record(5, 5).adjusted(i32::MAX),
            Err(InventoryError::CountOverflow { current: 5, delta: i32::MAX })
        );
        let r = record(i32::MAX - 1, 0).adjusted(1).unwrap();
        assert_eq!((r.total_copies, r.available_copies), (i32::MAX, 1));
        assert!(record(i32::MAX, 0).adjusted(1).is_err());
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let r = record(4, 1);
        assert_eq!(r.adjusted(0).unwrap(), r);
    }

    #[test]
    fn test_issue_needs_available_copy() {
        assert_eq!(
            record(5, 0).with_loan_issued(),
            Err(InventoryError::NoAvailableCopies)
        );
        let r = record(5, 1).with_loan_issued().unwrap();
        assert_eq!((r.total_copies, r.available_copies), (5, 0));
    }

    #[test]
    fn test_issue_then_restore_round_trips() {
        let before = record(10, 10);
        let after = before.with_loan_issued().unwrap().with_loan_restored().unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_restore_past_total_is_caught_by_gate() {
        // stock removed while a copy was out
        let r = record(1, 1).with_loan_issued().unwrap().adjusted(-1).unwrap();
        assert_eq!((r.total_copies, r.available_copies), (0, 0));
        let restored = r.with_loan_restored().unwrap();
        assert!(matches!(
            restored.validate(),
            Err(InventoryError::AvailableExceedsTotal { .. })
        ));
    }

    #[test]
    fn test_invariant_holds_over_mixed_sequence() {
        let mut r = record(0, 0);
        let ops: [i32; 8] = [4, 0, -1, 2, 0, -3, 0, 5];
        for delta in ops {
            r = if delta == 0 {
                match r.with_loan_issued() {
                    Ok(next) => next,
                    Err(_) => r,
                }
            } else {
                r.adjusted(delta).unwrap()
            };
            assert!(r.validate().is_ok(), "invariant broken at {:?}", r);
        }
    }
}
