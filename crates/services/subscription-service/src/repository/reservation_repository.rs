//! Reservation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, FromQueryResult, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::reservation::{self, ActiveModel, Entity as ReservationEntity};
use super::entities::user::Entity as UserEntity;
use common::{AppError, AppResult};
use domain::{NewReservation, Reservation};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Reservation repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Store a usage record; `reserved_at` defaults to now
    async fn create(&self, user_id: Uuid, reservation: NewReservation) -> AppResult<Reservation>;

    /// Sum of free hours the user consumed in reservations within `[since, until)`
    async fn free_hours_used_between(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Decimal>;

    /// Store a usage record only if the free hours already used in `[since, until)`
    /// plus this reservation's stay within `allowance`.
    ///
    /// The check and the insert happen under a lock on the user's row, so two
    /// concurrent reservations cannot both spend the same remaining hours.
    /// Returns `None` when the allowance would be exceeded.
    async fn create_within_allowance(
        &self,
        user_id: Uuid,
        reservation: NewReservation,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        allowance: Decimal,
    ) -> AppResult<Option<Reservation>>;
}

/// Concrete implementation of ReservationRepository
pub struct ReservationStore {
    db: DatabaseConnection,
}

impl ReservationStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct FreeHoursTotal {
    total: Option<Decimal>,
}

fn into_active_model(user_id: Uuid, reservation: NewReservation) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        reserved_at: Set(reservation.reserved_at.unwrap_or_else(Utc::now)),
        hours_used: Set(reservation.hours_used),
        free_hours_used: Set(reservation.free_hours_used),
        cost: Set(reservation.cost),
    }
}

async fn sum_free_hours<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> AppResult<Decimal> {
    let result = ReservationEntity::find()
        .select_only()
        .column_as(Expr::col(reservation::Column::FreeHoursUsed).sum(), "total")
        .filter(reservation::Column::UserId.eq(user_id))
        .filter(reservation::Column::ReservedAt.gte(since))
        .filter(reservation::Column::ReservedAt.lt(until))
        .into_model::<FreeHoursTotal>()
        .one(conn)
        .await
        .map_err(AppError::from)?;

    Ok(result.and_then(|row| row.total).unwrap_or(Decimal::ZERO))
}

#[async_trait]
impl ReservationRepository for ReservationStore {
    async fn create(&self, user_id: Uuid, reservation: NewReservation) -> AppResult<Reservation> {
        let model = into_active_model(user_id, reservation)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(Reservation::from(model))
    }

    async fn free_hours_used_between(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Decimal> {
        sum_free_hours(&self.db, user_id, since, until).await
    }

    async fn create_within_allowance(
        &self,
        user_id: Uuid,
        reservation: NewReservation,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        allowance: Decimal,
    ) -> AppResult<Option<Reservation>> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        // Serializes allowance checks per user
        UserEntity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(AppError::from)?;

        let used = sum_free_hours(&txn, user_id, since, until).await?;
        if used + reservation.free_hours_used > allowance {
            txn.rollback().await.map_err(AppError::from)?;
            return Ok(None);
        }

        let model = into_active_model(user_id, reservation)
            .insert(&txn)
            .await
            .map_err(AppError::from)?;
        txn.commit().await.map_err(AppError::from)?;

        Ok(Some(Reservation::from(model)))
    }
}
