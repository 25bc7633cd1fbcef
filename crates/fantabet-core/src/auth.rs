// Access gate for administrative operations.

use thiserror::Error;

use crate::config::AccessConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("permission denied: only administrators may {action}")]
pub struct PermissionDenied {
    pub action: &'static str,
}

/// Whoever is invoking a league operation.
pub trait Identity {
    fn is_admin(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
    admin: bool,
}

impl Caller {
    /// Resolve `user_id` against the configured administrator list.
    pub fn from_config(user_id: Option<&str>, access: &AccessConfig) -> Self {
        let admin = user_id.is_some_and(|id| access.admin_ids.iter().any(|a| a == id));
        Caller {
            user_id: user_id.map(str::to_string),
            admin,
        }
    }

    pub fn anonymous() -> Self {
        Caller {
            user_id: None,
            admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Caller {
            user_id: Some(user_id.into()),
            admin: true,
        }
    }
}

impl Identity for Caller {
    fn is_admin(&self) -> bool {
        self.admin
    }
}

pub fn require_admin(caller: &dyn Identity, action: &'static str) -> Result<(), PermissionDenied> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(PermissionDenied { action })
    }
}
