//! Overdue classification of schedule entries

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ScheduleEntry, ScheduleStatus};

/// Status shown in reports. `Overdue` is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DerivedStatus {
    Unpaid,
    Paid,
    Late,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub derived_status: DerivedStatus,
    pub days_overdue: i64,
    /// The persisted row should move from Unpaid to Late
    pub requires_late_transition: bool,
}

impl Classification {
    /// Persisted status once the Late transition (if any) has been written
    pub fn resulting_status(&self, current: ScheduleStatus) -> ScheduleStatus {
        if self.requires_late_transition {
            ScheduleStatus::Late
        } else {
            current
        }
    }
}

/// Whole calendar days between `due_date` and `as_of`, never negative
pub fn days_overdue(due_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - due_date).num_days().max(0)
}

/// Classify an entry as of a calendar date. Pure: the Late write is the
/// caller's job when `requires_late_transition` is set.
pub fn classify(status: ScheduleStatus, due_date: NaiveDate, as_of: NaiveDate) -> Classification {
    match status {
        ScheduleStatus::Unpaid if due_date < as_of => Classification {
            derived_status: DerivedStatus::Overdue,
            days_overdue: days_overdue(due_date, as_of),
            requires_late_transition: true,
        },
        ScheduleStatus::Unpaid => Classification {
            derived_status: DerivedStatus::Unpaid,
            days_overdue: 0,
            requires_late_transition: false,
        },
        ScheduleStatus::Late => Classification {
            derived_status: DerivedStatus::Late,
            days_overdue: days_overdue(due_date, as_of),
            requires_late_transition: false,
        },
        ScheduleStatus::Paid => Classification {
            derived_status: DerivedStatus::Paid,
            days_overdue: 0,
            requires_late_transition: false,
        },
    }
}

/// Classify a loaded schedule row
pub fn classify_entry(entry: &ScheduleEntry, as_of: NaiveDate) -> Classification {
    classify(entry.status, entry.due_date, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let c = classify(ScheduleStatus::Unpaid, date("2024-03-05"), date("2024-03-05"));
        assert_eq!(c.derived_status, DerivedStatus::Unpaid);
        assert_eq!(c.days_overdue, 0);
        assert!(!c.requires_late_transition);
    }

    #[test]
    fn test_one_day_past_due() {
        let c = classify(ScheduleStatus::Unpaid, date("2024-03-05"), date("2024-03-06"));
        assert_eq!(c.derived_status, DerivedStatus::Overdue);
        assert_eq!(c.days_overdue, 1);
        assert_eq!(c.resulting_status(ScheduleStatus::Unpaid), ScheduleStatus::Late);
    }

    #[test]
    fn test_paid_entry_reports_zero_days() {
        let c = classify(ScheduleStatus::Paid, date("2024-01-01"), date("2024-02-01"));
        assert_eq!(c.derived_status, DerivedStatus::Paid);
        assert_eq!(c.days_overdue, 0);
        assert_eq!(c.resulting_status(ScheduleStatus::Paid), ScheduleStatus::Paid);
    }

    #[test]
    fn test_days_span_month_and_leap_day() {
        assert_eq!(days_overdue(date("2024-02-28"), date("2024-03-01")), 2);
        assert_eq!(days_overdue(date("2024-03-01"), date("2024-02-28")), 0);
    }
}
