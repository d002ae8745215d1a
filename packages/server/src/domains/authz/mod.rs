//! Role predicates consumed by the trust core.
//!
//! Roles are a closed enum persisted as integers; an unknown integer fails
//! to decode instead of silently falling through to "not elevated".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sales = 10,
    Operations = 20,
    Audit = 30,
    Management = 40,
    Admin = 50,
}

impl Role {
    /// Cross-deal operational authority: may act on documents beyond the
    /// ones their own deals produced.
    pub fn is_elevated(self) -> bool {
        match self {
            Role::Operations | Role::Management | Role::Admin => true,
            Role::Sales | Role::Audit => false,
        }
    }

    /// Audit sees everything, mutates nothing.
    pub fn is_read_only(self) -> bool {
        match self {
            Role::Audit => true,
            Role::Sales | Role::Operations | Role::Management | Role::Admin => false,
        }
    }

    /// Senior roles may put the final signature on a document.
    pub fn is_senior(self) -> bool {
        match self {
            Role::Management | Role::Admin => true,
            Role::Sales | Role::Operations | Role::Audit => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevated_roles() {
        assert!(!Role::Sales.is_elevated());
        assert!(Role::Operations.is_elevated());
        assert!(!Role::Audit.is_elevated());
        assert!(Role::Management.is_elevated());
        assert!(Role::Admin.is_elevated());
    }

    #[test]
    fn audit_is_the_only_read_only_role() {
        assert!(Role::Audit.is_read_only());
        assert!(!Role::Sales.is_read_only());
        assert!(!Role::Operations.is_read_only());
        assert!(!Role::Management.is_read_only());
        assert!(!Role::Admin.is_read_only());
    }

    #[test]
    fn only_management_and_admin_are_senior() {
        assert!(!Role::Operations.is_senior());
        assert!(Role::Management.is_senior());
        assert!(Role::Admin.is_senior());
    }
}
