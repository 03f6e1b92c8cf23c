//! Background Late transition
//!
//! Moves past-due Unpaid schedule rows to Late on a fixed interval, so the
//! persisted status does not depend on someone opening the overdue report.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiResult;
use crate::repayment::classify;

use super::ScheduleService;

/// Run one sweep as of `as_of`; returns the number of rows marked Late
pub async fn sweep_overdue(schedule_service: &ScheduleService, as_of: NaiveDate) -> ApiResult<u64> {
    let due: Vec<_> = schedule_service
        .open_due_by(as_of)
        .await?
        .into_iter()
        .filter(|(_, status, due_date)| classify(*status, *due_date, as_of).requires_late_transition)
        .map(|(id, _, _)| id)
        .collect();

    schedule_service.mark_late(&due).await
}

/// Sweep forever, sleeping `interval` between runs. Errors are logged and the loop continues.
pub async fn overdue_sweeper(schedule_service: Arc<ScheduleService>, interval: Duration) {
    tracing::info!(interval_secs = interval.as_secs(), "Starting overdue sweeper");

    loop {
        match sweep_overdue(&schedule_service, Utc::now().date_naive()).await {
            Ok(0) => tracing::debug!("Overdue sweep found nothing to mark"),
            Ok(marked) => tracing::info!(marked, "Overdue sweep marked rows late"),
            Err(e) => tracing::error!("Error sweeping overdue schedule rows: {}", e),
        }

        tokio::time::sleep(interval).await;
    }
}
