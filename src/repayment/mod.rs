//! Repayment schedule reconciliation
//!
//! Pure decision logic over already-loaded schedule rows:
//! - payment allocation across outstanding installments, oldest due first
//! - overdue classification with an explicit Late transition flag
//!
//! Persistence of the resulting row changes lives in the schedule and payment
//! services.

mod allocator;
mod overdue;

pub use allocator::{
    allocate, check_payment_amount, is_whole_cents, Allocation, AllocationError, OutstandingEntry,
    ScheduleUpdate, MONEY_SCALE,
};
pub use overdue::{classify, classify_entry, days_overdue, Classification, DerivedStatus};
