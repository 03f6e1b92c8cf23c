//! Loan desk backend library
//!
//! Customer, loan, repayment schedule and payment management for a small
//! lending office, with role-based access and management reports.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repayment;
pub mod routes;
pub mod services;
pub mod state;
