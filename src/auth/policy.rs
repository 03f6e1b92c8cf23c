//! Role-based access decisions
//!
//! Every handler asks the policy before touching a resource. The table is a
//! closed match over the role/operation/resource enums, so adding a variant
//! forces a decision here.
//!
//! Deletion has its own path: the generic table never grants `Delete` to a
//! non-admin role, and delete handlers additionally call [`can_delete`].

use serde::{Deserialize, Serialize};

use crate::models::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    View,
    Edit,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::View,
        Operation::Edit,
        Operation::Delete,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Operation::Create),
            "view" => Some(Operation::View),
            "edit" => Some(Operation::Edit),
            "delete" => Some(Operation::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::View => "view",
            Operation::Edit => "edit",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Customer,
    Loan,
    Repayment,
    Payment,
    User,
    Report,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Customer,
        Resource::Loan,
        Resource::Repayment,
        Resource::Payment,
        Resource::User,
        Resource::Report,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Customer" => Some(Resource::Customer),
            "Loan" => Some(Resource::Loan),
            "Repayment" => Some(Resource::Repayment),
            "Payment" => Some(Resource::Payment),
            "User" => Some(Resource::User),
            "Report" => Some(Resource::Report),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Customer => "Customer",
            Resource::Loan => "Loan",
            Resource::Repayment => "Repayment",
            Resource::Payment => "Payment",
            Resource::User => "User",
            Resource::Report => "Report",
        }
    }
}

/// Whether `role` may perform `operation` on `resource`.
pub fn allowed(role: UserRole, operation: Operation, resource: Resource) -> bool {
    use Operation::*;
    use Resource::*;

    match role {
        UserRole::Admin => true,
        UserRole::LoanOfficer => match resource {
            Customer | Loan => matches!(operation, Create | View | Edit),
            Repayment | Payment | Report => operation == View,
            User => false,
        },
        UserRole::Cashier => match resource {
            Customer | Loan | Repayment | Report => operation == View,
            Payment => matches!(operation, Create | View | Edit),
            User => false,
        },
    }
}

/// Deletion is reserved to Admin for every resource.
pub fn can_delete(role: UserRole) -> bool {
    role == UserRole::Admin
}

/// String boundary: anything that does not parse into the enums is denied.
pub fn allowed_str(role: &str, operation: &str, resource: &str) -> bool {
    match (
        UserRole::parse(role),
        Operation::parse(operation),
        Resource::parse(resource),
    ) {
        (Some(role), Some(operation), Some(resource)) => allowed(role, operation, resource),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_admin_never_deletes() {
        for resource in Resource::ALL {
            assert!(!allowed(UserRole::LoanOfficer, Operation::Delete, resource));
            assert!(!allowed(UserRole::Cashier, Operation::Delete, resource));
        }
        assert!(can_delete(UserRole::Admin));
        assert!(!can_delete(UserRole::LoanOfficer));
        assert!(!can_delete(UserRole::Cashier));
    }

    #[test]
    fn test_string_boundary() {
        assert!(allowed_str("Cashier", "create", "Payment"));
        assert!(allowed_str("Loan Officer", "edit", "Loan"));
        assert!(!allowed_str("Cashier", "approve", "Payment"));
        assert!(!allowed_str("Auditor", "view", "Report"));
        assert!(!allowed_str("Admin", "view", "Invoice"));
    }
}
