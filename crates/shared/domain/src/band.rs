//! Band and membership entities.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    BAND_ROLE_ADMIN, BAND_ROLE_MEMBER, MAX_BAND_NAME_LENGTH, MEMBERSHIP_STATUS_ACTIVE,
    MEMBERSHIP_STATUS_DECLINED, MEMBERSHIP_STATUS_INVITED, MIN_BAND_NAME_LENGTH,
};
use crate::error::{DomainError, DomainResult};

/// Role a member holds inside a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BandRole {
    Admin,
    Member,
}

impl BandRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandRole::Admin => BAND_ROLE_ADMIN,
            BandRole::Member => BAND_ROLE_MEMBER,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, BandRole::Admin)
    }
}

impl FromStr for BandRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            BAND_ROLE_ADMIN => Ok(BandRole::Admin),
            BAND_ROLE_MEMBER => Ok(BandRole::Member),
            other => Err(DomainError::validation(format!("Unknown band role '{}'", other))),
        }
    }
}

impl std::fmt::Display for BandRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invitation lifecycle state.
///
/// `Invited` moves to `Active` or `Declined`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Invited,
    Active,
    Declined,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Invited => MEMBERSHIP_STATUS_INVITED,
            MembershipStatus::Active => MEMBERSHIP_STATUS_ACTIVE,
            MembershipStatus::Declined => MEMBERSHIP_STATUS_DECLINED,
        }
    }

    pub fn can_transition_to(&self, next: MembershipStatus) -> bool {
        matches!(
            (self, next),
            (MembershipStatus::Invited, MembershipStatus::Active)
                | (MembershipStatus::Invited, MembershipStatus::Declined)
        )
    }
}

impl FromStr for MembershipStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MEMBERSHIP_STATUS_INVITED => Ok(MembershipStatus::Invited),
            MEMBERSHIP_STATUS_ACTIVE => Ok(MembershipStatus::Active),
            MEMBERSHIP_STATUS_DECLINED => Ok(MembershipStatus::Declined),
            other => Err(DomainError::validation(format!(
                "Unknown membership status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Band {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Band creation data
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBand {
    pub name: String,
    pub bio: Option<String>,
}

impl CreateBand {
    /// Trim fields and check name length
    pub fn normalized(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        let length = name.chars().count();
        if !(MIN_BAND_NAME_LENGTH..=MAX_BAND_NAME_LENGTH).contains(&length) {
            return Err(DomainError::validation(format!(
                "Band name must be between {} and {} characters",
                MIN_BAND_NAME_LENGTH, MAX_BAND_NAME_LENGTH
            )));
        }

        let bio = self
            .bio
            .map(|bio| bio.trim().to_string())
            .filter(|bio| !bio.is_empty());

        Ok(Self { name, bio })
    }
}

/// Link between a user and a band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Membership {
    pub id: Uuid,
    pub band_id: Uuid,
    pub user_id: Uuid,
    pub role: BandRole,
    /// Free-text, e.g. "bass" or "vocals"
    pub instrument: Option<String>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// New pending invitation
    pub fn invite(
        band_id: Uuid,
        user_id: Uuid,
        role: BandRole,
        instrument: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            band_id,
            user_id,
            role,
            instrument: instrument
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
            status: MembershipStatus::Invited,
            created_at: now,
            updated_at: now,
        }
    }

    /// Founding admin membership, active immediately
    pub fn founder(band_id: Uuid, user_id: Uuid) -> Self {
        Self {
            status: MembershipStatus::Active,
            ..Self::invite(band_id, user_id, BandRole::Admin, None)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Invited
    }

    /// Active membership with the band admin role
    pub fn is_active_admin(&self) -> bool {
        self.status == MembershipStatus::Active && self.role.is_admin()
    }

    /// Apply a status change permitted by the invitation state machine
    pub fn transition_to(&mut self, next: MembershipStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
