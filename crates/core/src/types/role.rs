//! Back-office user roles.

use serde::{Deserialize, Serialize};

/// Role of a back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Manages projects, blog content and uploads.
    #[default]
    Admin,
    /// Everything an admin can do, plus user management and activity logs.
    SuperAdmin,
}

impl UserRole {
    /// Whether this role may manage other users and read activity logs.
    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
