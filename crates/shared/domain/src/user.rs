//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_MEMBER, ROLE_SUSTAINING_MEMBER};
use crate::error::DomainError;

/// Site-wide roles a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "member")]
    Member,
    #[serde(rename = "sustaining member")]
    SustainingMember,
}

/// Things a role can permit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Invite into any band regardless of band role
    ManageAnyBand,
    /// View collective-wide subscription statistics
    ViewSubscriptionStats,
    /// Record incoming payments
    RecordPayments,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Member => ROLE_MEMBER,
            Role::SustainingMember => ROLE_SUSTAINING_MEMBER,
        }
    }

    /// Check whether this role grants a capability
    pub fn grants(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => matches!(
                capability,
                Capability::ManageAnyBand
                    | Capability::ViewSubscriptionStats
                    | Capability::RecordPayments
            ),
            Role::Member | Role::SustainingMember => false,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MEMBER => Ok(Role::Member),
            ROLE_SUSTAINING_MEMBER => Ok(Role::SustainingMember),
            other => Err(DomainError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Correlates the user with external payment records
    pub email: String,
    pub name: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default member role
    pub fn new(id: Uuid, email: String, name: String) -> Self {
        Self {
            id,
            email,
            name,
            roles: vec![Role::Member],
            created_at: Utc::now(),
        }
    }

    /// Check if user holds a role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if any of the user's roles grants a capability
    pub fn can(&self, capability: Capability) -> bool {
        self.roles.iter().any(|role| role.grants(capability))
    }

    /// Add a role; returns false if already held
    pub fn grant_role(&mut self, role: Role) -> bool {
        if self.has_role(role) {
            return false;
        }
        self.roles.push(role);
        self.roles.sort();
        true
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address
    pub email: String,
    /// User display name
    pub name: String,
    /// Site-wide roles
    pub roles: Vec<Role>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            roles: user.roles,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_name() {
        for role in [Role::Admin, Role::Member, Role::SustainingMember] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn sustaining_role_serializes_with_space() {
        let json = serde_json::to_string(&Role::SustainingMember).unwrap();
        assert_eq!(json, "\"sustaining member\"");
    }

    #[test]
    fn capabilities_follow_roles() {
        let mut user = User::new(Uuid::new_v4(), "a@example.com".into(), "A".into());
        assert!(!user.can(Capability::RecordPayments));
        assert!(!user.can(Capability::ManageAnyBand));

        assert!(user.grant_role(Role::SustainingMember));
        assert!(!user.can(Capability::RecordPayments));

        assert!(user.grant_role(Role::Admin));
        assert!(user.can(Capability::ViewSubscriptionStats));
        assert!(user.can(Capability::RecordPayments));
    }

    #[test]
    fn grant_role_is_idempotent() {
        let mut user = User::new(Uuid::new_v4(), "b@example.com".into(), "B".into());
        assert!(user.grant_role(Role::SustainingMember));
        assert!(!user.grant_role(Role::SustainingMember));
        assert_eq!(user.roles, vec![Role::Member, Role::SustainingMember]);
    }
}
