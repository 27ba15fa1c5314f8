//! Membership service - band creation and the invitation workflow.
//!
//! The acting user is always passed in explicitly. Accept and decline
//! return the updated membership on success and an error otherwise; there
//! is no "false means failed" path.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{Band, BandRole, Capability, CreateBand, Membership, MembershipStatus, User};

use crate::repository::{BandRepository, MembershipRepository};

/// Membership service trait for dependency injection.
#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Create a band; the actor becomes its active admin
    async fn create_band(&self, actor: &User, band: CreateBand) -> AppResult<Band>;

    /// Get band by ID
    async fn get_band(&self, band_id: Uuid) -> AppResult<Band>;

    /// Load the band if the actor may manage it, `Forbidden` otherwise
    async fn authorize_management(&self, actor: &User, band_id: Uuid) -> AppResult<Band>;

    /// Invite a user into a band (band admins and site admins only)
    async fn invite_member(
        &self,
        actor: &User,
        band_id: Uuid,
        user_id: Uuid,
        role: BandRole,
        instrument: Option<String>,
    ) -> AppResult<Membership>;

    /// Accept a pending invitation
    async fn accept_invitation(&self, band_id: Uuid, user_id: Uuid) -> AppResult<Membership>;

    /// Decline a pending invitation
    async fn decline_invitation(&self, band_id: Uuid, user_id: Uuid) -> AppResult<Membership>;

    /// Bands the user has been invited to and not yet answered
    async fn pending_invitations(&self, user_id: Uuid) -> AppResult<Vec<Band>>;

    /// Active members of a band
    async fn active_members(&self, band_id: Uuid) -> AppResult<Vec<Membership>>;
}

/// Concrete implementation of MembershipService using repositories.
pub struct MembershipManager {
    bands: Arc<dyn BandRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl MembershipManager {
    /// Create new membership service instance with repositories
    pub fn new(bands: Arc<dyn BandRepository>, memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { bands, memberships }
    }

    /// Answer a pending invitation.
    ///
    /// The status check happens twice: once on the loaded row and once in
    /// the conditional update, so a concurrent answer cannot apply both.
    async fn respond(&self, band_id: Uuid, user_id: Uuid, next: MembershipStatus) -> AppResult<Membership> {
        let mut membership = self
            .memberships
            .find(band_id, user_id)
            .await?
            .filter(Membership::is_pending)
            .ok_or_else(|| {
                warn!(%band_id, %user_id, "No pending invitation to answer");
                AppError::InvitationNotFound
            })?;

        membership.transition_to(next)?;

        let applied = self
            .memberships
            .update_status(band_id, user_id, MembershipStatus::Invited, next)
            .await?;
        if !applied {
            warn!(%band_id, %user_id, "Invitation was answered concurrently");
            return Err(AppError::InvitationNotFound);
        }

        info!(%band_id, %user_id, status = %next, "Invitation answered");
        Ok(membership)
    }

    async fn can_manage(&self, actor: &User, band_id: Uuid) -> AppResult<bool> {
        if actor.can(Capability::ManageAnyBand) {
            return Ok(true);
        }

        let acting = self.memberships.find(band_id, actor.id).await?;
        Ok(acting.is_some_and(|m| m.is_active_admin()))
    }
}

#[async_trait]
impl MembershipService for MembershipManager {
    async fn create_band(&self, actor: &User, band: CreateBand) -> AppResult<Band> {
        let band = band.normalized()?;
        let (band, _founder) = self.bands.create_with_founder(band, actor.id).await?;

        info!(band_id = %band.id, founder = %actor.id, "Band created");
        Ok(band)
    }

    async fn get_band(&self, band_id: Uuid) -> AppResult<Band> {
        self.bands.find_by_id(band_id).await?.ok_or_not_found("Band")
    }

    async fn authorize_management(&self, actor: &User, band_id: Uuid) -> AppResult<Band> {
        let band = self.get_band(band_id).await?;

        if !self.can_manage(actor, band.id).await? {
            warn!(%band_id, actor = %actor.id, "Rejected: actor is not a band admin");
            return Err(AppError::Forbidden);
        }
        Ok(band)
    }

    async fn invite_member(
        &self,
        actor: &User,
        band_id: Uuid,
        user_id: Uuid,
        role: BandRole,
        instrument: Option<String>,
    ) -> AppResult<Membership> {
        let band = self.authorize_management(actor, band_id).await?;

        if self.memberships.find(band.id, user_id).await?.is_some() {
            debug!(%band_id, %user_id, "Membership already exists");
            return Err(AppError::DuplicateMembership);
        }

        let membership = self
            .memberships
            .create(Membership::invite(band.id, user_id, role, instrument))
            .await?;

        info!(%band_id, %user_id, role = %membership.role, "Member invited");
        Ok(membership)
    }

    async fn accept_invitation(&self, band_id: Uuid, user_id: Uuid) -> AppResult<Membership> {
        self.respond(band_id, user_id, MembershipStatus::Active).await
    }

    async fn decline_invitation(&self, band_id: Uuid, user_id: Uuid) -> AppResult<Membership> {
        self.respond(band_id, user_id, MembershipStatus::Declined).await
    }

    async fn pending_invitations(&self, user_id: Uuid) -> AppResult<Vec<Band>> {
        self.bands.pending_for_user(user_id).await
    }

    async fn active_members(&self, band_id: Uuid) -> AppResult<Vec<Membership>> {
        let band = self.get_band(band_id).await?;
        self.memberships
            .list_by_status(band.id, MembershipStatus::Active)
            .await
    }
}
