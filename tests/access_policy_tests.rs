//! Role-based access table tests

use loandesk_server::auth::{allowed, allowed_str, can_delete, Operation, Resource};
use loandesk_server::models::UserRole;

use Operation::*;
use Resource::*;

// ============================================================================
// Admin
// ============================================================================

#[test]
fn test_admin_is_allowed_everything() {
    for operation in Operation::ALL {
        for resource in Resource::ALL {
            assert!(
                allowed(UserRole::Admin, operation, resource),
                "Admin denied {:?} on {:?}",
                operation,
                resource
            );
        }
    }
}

// ============================================================================
// Loan Officer
// ============================================================================

#[test]
fn test_loan_officer_table() {
    let role = UserRole::LoanOfficer;

    for resource in [Customer, Loan] {
        assert!(allowed(role, Create, resource));
        assert!(allowed(role, View, resource));
        assert!(allowed(role, Edit, resource));
        assert!(!allowed(role, Delete, resource));
    }

    for resource in [Repayment, Payment, Report] {
        assert!(allowed(role, View, resource));
        assert!(!allowed(role, Create, resource));
        assert!(!allowed(role, Edit, resource));
        assert!(!allowed(role, Delete, resource));
    }

    for operation in Operation::ALL {
        assert!(!allowed(role, operation, User));
    }
}

// ============================================================================
// Cashier
// ============================================================================

#[test]
fn test_cashier_table() {
    let role = UserRole::Cashier;

    assert!(allowed(role, Create, Payment));
    assert!(allowed(role, View, Payment));
    assert!(allowed(role, Edit, Payment));
    assert!(!allowed(role, Delete, Payment));

    for resource in [Customer, Loan, Repayment, Report] {
        assert!(allowed(role, View, resource));
        assert!(!allowed(role, Create, resource));
        assert!(!allowed(role, Edit, resource));
        assert!(!allowed(role, Delete, resource));
    }

    for operation in Operation::ALL {
        assert!(!allowed(role, operation, User));
    }
}

#[test]
fn test_delete_is_admin_only() {
    assert!(can_delete(UserRole::Admin));
    assert!(!can_delete(UserRole::LoanOfficer));
    assert!(!can_delete(UserRole::Cashier));
}

// ============================================================================
// String boundary
// ============================================================================

#[test]
fn test_unknown_values_are_denied() {
    assert!(!allowed_str("Manager", "view", "Customer"));
    assert!(!allowed_str("Admin", "approve", "Loan"));
    assert!(!allowed_str("Admin", "view", "Collateral"));
    assert!(!allowed_str("", "", ""));
}

#[test]
fn test_known_values_follow_the_table() {
    assert!(allowed_str("Admin", "delete", "User"));
    assert!(allowed_str("Loan Officer", "create", "Loan"));
    assert!(!allowed_str("Loan Officer", "create", "Payment"));
    assert!(allowed_str("Cashier", "edit", "Payment"));
    assert!(!allowed_str("Cashier", "edit", "Customer"));
}
