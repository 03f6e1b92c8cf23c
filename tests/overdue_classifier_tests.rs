//! Overdue classification tests

use chrono::{Duration, NaiveDate};

use loandesk_server::models::ScheduleStatus;
use loandesk_server::repayment::{classify, days_overdue, DerivedStatus};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn test_ten_days_past_due_requires_late_transition() {
    let c = classify(ScheduleStatus::Unpaid, date("2024-01-01"), date("2024-01-11"));

    assert_eq!(c.days_overdue, 10);
    assert_eq!(c.derived_status, DerivedStatus::Overdue);
    assert!(c.requires_late_transition);
    assert_eq!(c.resulting_status(ScheduleStatus::Unpaid), ScheduleStatus::Late);
}

#[test]
fn test_late_rows_stay_late() {
    let due = date("2024-01-01");
    let mut status = ScheduleStatus::Unpaid;

    for offset in 0..60 {
        let as_of = due + Duration::days(offset);
        let c = classify(status, due, as_of);
        let next = c.resulting_status(status);

        if status == ScheduleStatus::Late {
            assert_eq!(next, ScheduleStatus::Late, "Late reverted on day {}", offset);
            assert!(!c.requires_late_transition);
        }
        status = next;
    }

    assert_eq!(status, ScheduleStatus::Late);
}

#[test]
fn test_paid_rows_are_never_overdue() {
    let c = classify(ScheduleStatus::Paid, date("2023-06-01"), date("2024-01-11"));
    assert_eq!(c.derived_status, DerivedStatus::Paid);
    assert_eq!(c.days_overdue, 0);
    assert!(!c.requires_late_transition);
}

#[test]
fn test_not_yet_due_rows_stay_unpaid() {
    let c = classify(ScheduleStatus::Unpaid, date("2024-02-01"), date("2024-01-11"));
    assert_eq!(c.derived_status, DerivedStatus::Unpaid);
    assert_eq!(c.days_overdue, 0);
    assert!(!c.requires_late_transition);
}

#[test]
fn test_days_overdue_never_negative() {
    assert_eq!(days_overdue(date("2024-01-11"), date("2024-01-01")), 0);
    assert_eq!(days_overdue(date("2024-02-28"), date("2024-03-01")), 2);
}
