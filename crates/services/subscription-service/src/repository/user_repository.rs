//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::user_role::{self, Entity as UserRoleEntity};
use common::{AppError, AppResult};
use domain::{Role, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Returned users carry their roles.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a user holding the member role
    async fn create(&self, email: String, name: String) -> AppResult<User>;

    /// Count all users
    async fn count(&self) -> AppResult<u64>;

    /// IDs of users whose email is in the list
    async fn ids_by_emails(&self, emails: Vec<String>) -> AppResult<Vec<Uuid>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Load role rows for a user and attach them
async fn with_roles<C: ConnectionTrait>(db: &C, model: user::Model) -> AppResult<User> {
    let mut roles = UserRoleEntity::find()
        .filter(user_role::Column::UserId.eq(model.id))
        .all(db)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(|row| row.role.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()?;
    roles.sort();
    Ok(model.into_domain(roles))
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Email"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        match result {
            Some(model) => Ok(Some(with_roles(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        match result {
            Some(model) => Ok(Some(with_roles(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, email: String, name: String) -> AppResult<User> {
        let now = chrono::Utc::now();
        let id = Uuid::new_v4();
        let active_model = ActiveModel {
            id: Set(id),
            email: Set(email),
            name: Set(name),
            created_at: Set(now),
        };
        let member_role = user_role::ActiveModel {
            user_id: Set(id),
            role: Set(Role::Member.as_str().to_string()),
            assigned_at: Set(now),
        };

        let txn = self.db.begin().await.map_err(AppError::from)?;
        let model = active_model.insert(&txn).await.map_err(map_insert_error)?;
        member_role.insert(&txn).await.map_err(AppError::from)?;
        txn.commit().await.map_err(AppError::from)?;

        Ok(model.into_domain(vec![Role::Member]))
    }

    async fn count(&self) -> AppResult<u64> {
        UserEntity::find()
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn ids_by_emails(&self, emails: Vec<String>) -> AppResult<Vec<Uuid>> {
        let models = UserEntity::find()
            .filter(user::Column::Email.is_in(emails))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(|m| m.id).collect())
    }
}
