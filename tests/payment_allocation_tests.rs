//! Payment allocation scenarios

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use loandesk_server::models::ScheduleStatus;
use loandesk_server::repayment::{allocate, AllocationError, OutstandingEntry};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn unpaid(due: &str, amount: Decimal) -> OutstandingEntry {
    OutstandingEntry {
        id: Uuid::new_v4(),
        due_date: date(due),
        amount_due: amount,
        outstanding_balance: amount,
        status: ScheduleStatus::Unpaid,
    }
}

fn two_installments() -> Vec<OutstandingEntry> {
    vec![unpaid("2024-01-01", dec!(40)), unpaid("2024-02-01", dec!(60))]
}

#[test]
fn test_exact_payment_settles_everything() {
    let rows = two_installments();
    let allocation = allocate(dec!(100), &rows).unwrap();

    assert_eq!(allocation.updates.len(), 2);
    for update in &allocation.updates {
        assert_eq!(update.new_status, ScheduleStatus::Paid);
        assert_eq!(update.new_outstanding_balance, Decimal::ZERO);
    }
    assert_eq!(allocation.applied, dec!(100));
    assert_eq!(allocation.unallocated, Decimal::ZERO);
}

#[test]
fn test_partial_payment_reduces_next_row_without_status_change() {
    let rows = two_installments();
    let allocation = allocate(dec!(50), &rows).unwrap();

    assert_eq!(allocation.updates.len(), 2);

    let first = &allocation.updates[0];
    assert_eq!(first.schedule_id, rows[0].id);
    assert_eq!(first.new_status, ScheduleStatus::Paid);
    assert_eq!(first.new_outstanding_balance, Decimal::ZERO);

    let second = &allocation.updates[1];
    assert_eq!(second.schedule_id, rows[1].id);
    assert_eq!(second.new_status, ScheduleStatus::Unpaid);
    assert_eq!(second.new_outstanding_balance, dec!(50));
}

#[test]
fn test_non_positive_amounts_are_rejected() {
    let rows = two_installments();

    assert_eq!(
        allocate(Decimal::ZERO, &rows),
        Err(AllocationError::NonPositiveAmount(Decimal::ZERO))
    );
    assert_eq!(
        allocate(dec!(-5), &rows),
        Err(AllocationError::NonPositiveAmount(dec!(-5)))
    );
}

#[test]
fn test_overpayment_leaves_residual_unallocated() {
    let rows = two_installments();
    let allocation = allocate(dec!(150), &rows).unwrap();

    assert!(allocation
        .updates
        .iter()
        .all(|u| u.new_status == ScheduleStatus::Paid && u.new_outstanding_balance == Decimal::ZERO));
    assert_eq!(allocation.applied, dec!(100));
    assert_eq!(allocation.unallocated, dec!(50));
}

#[test]
fn test_oldest_due_date_is_settled_first_regardless_of_input_order() {
    let later = unpaid("2024-03-01", dec!(30));
    let earliest = unpaid("2024-01-01", dec!(30));
    let middle = unpaid("2024-02-01", dec!(30));
    let rows = vec![later.clone(), earliest.clone(), middle.clone()];

    let allocation = allocate(dec!(45), &rows).unwrap();

    let touched: Vec<Uuid> = allocation.updates.iter().map(|u| u.schedule_id).collect();
    assert_eq!(touched, vec![earliest.id, middle.id]);
    assert_eq!(allocation.updates[1].new_outstanding_balance, dec!(15));
}

#[test]
fn test_loan_without_outstanding_rows_updates_nothing() {
    let mut paid = unpaid("2024-01-01", dec!(40));
    paid.status = ScheduleStatus::Paid;
    paid.outstanding_balance = Decimal::ZERO;

    let allocation = allocate(dec!(25), &[paid]).unwrap();
    assert!(allocation.is_empty());
    assert_eq!(allocation.unallocated, dec!(25));
}

#[test]
fn test_balances_never_go_negative() {
    let rows = vec![
        unpaid("2024-01-01", dec!(33.33)),
        unpaid("2024-02-01", dec!(33.33)),
        unpaid("2024-03-01", dec!(33.34)),
    ];

    for amount in [dec!(0.01), dec!(33.33), dec!(50), dec!(99.99), dec!(100), dec!(1000)] {
        let allocation = allocate(amount, &rows).unwrap();
        for update in &allocation.updates {
            assert!(update.new_outstanding_balance >= Decimal::ZERO);
            if update.new_status == ScheduleStatus::Paid {
                assert_eq!(update.new_outstanding_balance, Decimal::ZERO);
            }
        }
        assert_eq!(allocation.applied + allocation.unallocated, amount);
    }
}
