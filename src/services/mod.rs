//! Business logic services

mod customer_service;
mod loan_service;
mod overdue_sweeper;
mod payment_service;
mod report_service;
mod schedule_service;
pub mod tabular;
mod user_service;

pub use customer_service::CustomerService;
pub use loan_service::LoanService;
pub use overdue_sweeper::{overdue_sweeper, sweep_overdue};
pub use payment_service::PaymentService;
pub use report_service::{resolve_range, ReportService};
pub use schedule_service::ScheduleService;
pub use user_service::UserService;
