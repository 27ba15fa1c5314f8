//! Role store backed by the `user_roles` table.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::user_role::{self, ActiveModel, Entity as UserRoleEntity};
use common::{AppError, AppResult};
use domain::Role;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role assignment and checks per user.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Check whether the user holds the role
    async fn has(&self, user_id: Uuid, role: Role) -> AppResult<bool>;

    /// Grant the role; returns false when it was already held
    async fn assign(&self, user_id: Uuid, role: Role) -> AppResult<bool>;

    /// IDs of every user holding the role
    async fn holders(&self, role: Role) -> AppResult<Vec<Uuid>>;
}

/// Concrete implementation of RoleStore
pub struct UserRoleStore {
    db: DatabaseConnection,
}

impl UserRoleStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleStore for UserRoleStore {
    async fn has(&self, user_id: Uuid, role: Role) -> AppResult<bool> {
        let count = UserRoleEntity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::Role.eq(role.as_str()))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn assign(&self, user_id: Uuid, role: Role) -> AppResult<bool> {
        let model = ActiveModel {
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
            assigned_at: Set(chrono::Utc::now()),
        };

        // Concurrent assigners race on the primary key; only one inserts
        let inserted = UserRoleEntity::insert(model)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::Role])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(inserted == 1)
    }

    async fn holders(&self, role: Role) -> AppResult<Vec<Uuid>> {
        let rows = UserRoleEntity::find()
            .filter(user_role::Column::Role.eq(role.as_str()))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }
}
