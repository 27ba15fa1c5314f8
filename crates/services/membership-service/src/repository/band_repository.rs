//! Band repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::band::{self, ActiveModel, Entity as BandEntity};
use super::entities::band_member::{self, Entity as BandMemberEntity};
use common::{AppError, AppResult};
use domain::{Band, CreateBand, Membership, MEMBERSHIP_STATUS_INVITED};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Band repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BandRepository: Send + Sync {
    /// Find band by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Band>>;

    /// Create a band and its founder's active admin membership atomically
    async fn create_with_founder(&self, band: CreateBand, founder_id: Uuid) -> AppResult<(Band, Membership)>;

    /// Bands where the user holds an invitation that is still pending
    async fn pending_for_user(&self, user_id: Uuid) -> AppResult<Vec<Band>>;
}

/// Concrete implementation of BandRepository
pub struct BandStore {
    db: DatabaseConnection,
}

impl BandStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BandRepository for BandStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Band>> {
        let result = BandEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Band::from))
    }

    async fn create_with_founder(&self, band: CreateBand, founder_id: Uuid) -> AppResult<(Band, Membership)> {
        let now = chrono::Utc::now();
        let band_id = Uuid::new_v4();
        let active_band = ActiveModel {
            id: Set(band_id),
            name: Set(band.name),
            bio: Set(band.bio),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let founder = Membership::founder(band_id, founder_id);

        // Band and founder membership commit together or not at all
        let txn = self.db.begin().await.map_err(AppError::from)?;
        let band_model = active_band.insert(&txn).await.map_err(AppError::from)?;
        let member_model = band_member::ActiveModel::from(founder)
            .insert(&txn)
            .await
            .map_err(AppError::from)?;
        txn.commit().await.map_err(AppError::from)?;

        let membership = Membership::try_from(member_model)?;
        Ok((Band::from(band_model), membership))
    }

    async fn pending_for_user(&self, user_id: Uuid) -> AppResult<Vec<Band>> {
        let models = BandEntity::find()
            .inner_join(BandMemberEntity)
            .filter(band_member::Column::UserId.eq(user_id))
            .filter(band_member::Column::Status.eq(MEMBERSHIP_STATUS_INVITED))
            .order_by_asc(band::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Band::from).collect())
    }
}
