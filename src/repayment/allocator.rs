//! Payment allocation across outstanding schedule entries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ScheduleEntry, ScheduleStatus};

/// Allocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Payment amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Payment amount must be in whole cents, got {0}")]
    SubCentAmount(Decimal),
}

/// Decimal places every stored money column keeps
pub const MONEY_SCALE: u32 = 2;

/// True when `value` has no digits past the cent, so storing it loses nothing.
/// Trailing zeros do not count: `10.500` is whole cents.
pub fn is_whole_cents(value: Decimal) -> bool {
    value.round_dp(MONEY_SCALE) == value
}

/// Reject payment amounts the ledger could not store exactly
pub fn check_payment_amount(amount: Decimal) -> Result<(), AllocationError> {
    if amount <= Decimal::ZERO {
        return Err(AllocationError::NonPositiveAmount(amount));
    }
    if !is_whole_cents(amount) {
        return Err(AllocationError::SubCentAmount(amount));
    }
    Ok(())
}

/// The part of a schedule entry the allocator reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingEntry {
    pub id: Uuid,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub outstanding_balance: Decimal,
    pub status: ScheduleStatus,
}

impl From<&ScheduleEntry> for OutstandingEntry {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            due_date: entry.due_date,
            amount_due: entry.amount_due,
            outstanding_balance: entry.outstanding_balance,
            status: entry.status,
        }
    }
}

impl OutstandingEntry {
    /// Amount still needed to settle this entry.
    fn owed(&self) -> Decimal {
        self.outstanding_balance.max(Decimal::ZERO)
    }
}

/// New balance and status for one schedule row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleUpdate {
    pub schedule_id: Uuid,
    pub new_outstanding_balance: Decimal,
    pub new_status: ScheduleStatus,
}

/// Result of spreading one payment over a loan's schedule
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocation {
    /// Rows touched, in the order they were settled
    pub updates: Vec<ScheduleUpdate>,
    /// Total absorbed by schedule rows
    pub applied: Decimal,
    /// Residual no outstanding row could absorb. Not credited anywhere.
    pub unallocated: Decimal,
}

impl Allocation {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Distribute `amount` across `entries`, oldest due date first.
///
/// Entries are sorted by due date before the walk, so callers need not
/// pre-sort. Paid entries are skipped; Late entries are treated as Unpaid.
/// Each entry is either settled in full (balance 0, status Paid) or, for the
/// last one reached, reduced by whatever remains with its status unchanged.
///
/// Non-positive and sub-cent amounts are rejected before anything is
/// allocated, so every new balance has at most two decimal places.
pub fn allocate(
    amount: Decimal,
    entries: &[OutstandingEntry],
) -> Result<Allocation, AllocationError> {
    check_payment_amount(amount)?;

    let mut ordered: Vec<&OutstandingEntry> = entries
        .iter()
        .filter(|entry| entry.status.is_outstanding())
        .collect();
    ordered.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

    let mut remaining = amount;
    let mut updates = Vec::new();

    for entry in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }

        let owed = entry.owed();
        if remaining >= owed {
            updates.push(ScheduleUpdate {
                schedule_id: entry.id,
                new_outstanding_balance: Decimal::ZERO,
                new_status: ScheduleStatus::Paid,
            });
            remaining -= owed;
        } else {
            updates.push(ScheduleUpdate {
                schedule_id: entry.id,
                new_outstanding_balance: owed - remaining,
                new_status: entry.status,
            });
            remaining = Decimal::ZERO;
        }
    }

    Ok(Allocation {
        updates,
        applied: amount - remaining,
        unallocated: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(due: &str, owed: Decimal, status: ScheduleStatus) -> OutstandingEntry {
        OutstandingEntry {
            id: Uuid::new_v4(),
            due_date: due.parse().unwrap(),
            amount_due: owed,
            outstanding_balance: owed,
            status,
        }
    }

    #[test]
    fn test_late_entry_is_allocated_like_unpaid() {
        let late = entry("2024-01-01", dec!(40), ScheduleStatus::Late);
        let allocation = allocate(dec!(40), &[late.clone()]).unwrap();

        assert_eq!(allocation.updates.len(), 1);
        assert_eq!(allocation.updates[0].schedule_id, late.id);
        assert_eq!(allocation.updates[0].new_status, ScheduleStatus::Paid);
    }

    #[test]
    fn test_partial_on_late_entry_keeps_late() {
        let late = entry("2024-01-01", dec!(40), ScheduleStatus::Late);
        let allocation = allocate(dec!(15), &[late]).unwrap();

        assert_eq!(allocation.updates[0].new_status, ScheduleStatus::Late);
        assert_eq!(allocation.updates[0].new_outstanding_balance, dec!(25));
    }

    #[test]
    fn test_paid_entries_are_skipped() {
        let paid = OutstandingEntry {
            outstanding_balance: Decimal::ZERO,
            ..entry("2024-01-01", dec!(40), ScheduleStatus::Paid)
        };
        let open = entry("2024-02-01", dec!(60), ScheduleStatus::Unpaid);
        let allocation = allocate(dec!(60), &[paid, open.clone()]).unwrap();

        assert_eq!(allocation.updates.len(), 1);
        assert_eq!(allocation.updates[0].schedule_id, open.id);
    }

    #[test]
    fn test_previously_partially_paid_entry_settles_on_remaining_balance() {
        let partly = OutstandingEntry {
            outstanding_balance: dec!(50),
            ..entry("2024-01-01", dec!(60), ScheduleStatus::Unpaid)
        };
        let next = entry("2024-02-01", dec!(60), ScheduleStatus::Unpaid);
        let allocation = allocate(dec!(60), &[partly, next]).unwrap();

        assert_eq!(allocation.updates[0].new_outstanding_balance, Decimal::ZERO);
        assert_eq!(allocation.updates[0].new_status, ScheduleStatus::Paid);
        assert_eq!(allocation.updates[1].new_outstanding_balance, dec!(50));
        assert_eq!(allocation.applied, dec!(60));
        assert_eq!(allocation.unallocated, Decimal::ZERO);
    }

    #[test]
    fn test_no_outstanding_entries_is_a_no_op() {
        let allocation = allocate(dec!(25), &[]).unwrap();
        assert!(allocation.is_empty());
        assert_eq!(allocation.applied, Decimal::ZERO);
        assert_eq!(allocation.unallocated, dec!(25));
    }

    #[test]
    fn test_sub_cent_amount_is_rejected_before_allocation() {
        let open = entry("2024-01-01", dec!(40), ScheduleStatus::Unpaid);

        assert_eq!(
            allocate(dec!(10.005), &[open.clone()]),
            Err(AllocationError::SubCentAmount(dec!(10.005)))
        );
        assert_eq!(
            allocate(dec!(0.001), &[open.clone()]),
            Err(AllocationError::SubCentAmount(dec!(0.001)))
        );

        let allocation = allocate(dec!(10.500), &[open]).unwrap();
        assert_eq!(allocation.updates[0].new_outstanding_balance, dec!(29.5));
    }

    #[test]
    fn test_whole_cents() {
        assert!(is_whole_cents(dec!(40)));
        assert!(is_whole_cents(dec!(40.01)));
        assert!(is_whole_cents(dec!(40.0100)));
        assert!(!is_whole_cents(dec!(40.004)));
    }
}
