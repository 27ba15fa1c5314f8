//! Membership repository with conditional status transitions.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use super::entities::band_member::{self, ActiveModel, Entity as BandMemberEntity};
use common::{AppError, AppResult};
use domain::{Membership, MembershipStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Membership repository trait for dependency injection.
///
/// At most one row exists per (band, user); the unique index on those
/// columns backs this up when two invites race.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find the membership for a (band, user) pair in any status
    async fn find(&self, band_id: Uuid, user_id: Uuid) -> AppResult<Option<Membership>>;

    /// Insert a membership; a second row for the same pair is `DuplicateMembership`
    async fn create(&self, membership: Membership) -> AppResult<Membership>;

    /// Move the pair from `from` to `to` only if it is still in `from`.
    ///
    /// Returns false when no row matched.
    async fn update_status(
        &self,
        band_id: Uuid,
        user_id: Uuid,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> AppResult<bool>;

    /// All memberships of a band in the given status
    async fn list_by_status(&self, band_id: Uuid, status: MembershipStatus) -> AppResult<Vec<Membership>>;
}

/// Concrete implementation of MembershipRepository
pub struct MembershipStore {
    db: DatabaseConnection,
}

impl MembershipStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(model: band_member::Model) -> AppResult<Membership> {
    Membership::try_from(model).map_err(AppError::from)
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateMembership,
        _ => AppError::from(err),
    }
}

#[async_trait]
impl MembershipRepository for MembershipStore {
    async fn find(&self, band_id: Uuid, user_id: Uuid) -> AppResult<Option<Membership>> {
        BandMemberEntity::find()
            .filter(band_member::Column::BandId.eq(band_id))
            .filter(band_member::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(to_domain)
            .transpose()
    }

    async fn create(&self, membership: Membership) -> AppResult<Membership> {
        let model = ActiveModel::from(membership)
            .insert(&self.db)
            .await
            .map_err(map_insert_error)?;

        to_domain(model)
    }

    async fn update_status(
        &self,
        band_id: Uuid,
        user_id: Uuid,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> AppResult<bool> {
        let result = BandMemberEntity::update_many()
            .col_expr(band_member::Column::Status, Expr::value(to.as_str()))
            .col_expr(band_member::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(band_member::Column::BandId.eq(band_id))
            .filter(band_member::Column::UserId.eq(user_id))
            .filter(band_member::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn list_by_status(&self, band_id: Uuid, status: MembershipStatus) -> AppResult<Vec<Membership>> {
        BandMemberEntity::find()
            .filter(band_member::Column::BandId.eq(band_id))
            .filter(band_member::Column::Status.eq(status.as_str()))
            .order_by_asc(band_member::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(to_domain)
            .collect()
    }
}
