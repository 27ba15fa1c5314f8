//! Payment transaction repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::transaction::{self, ActiveModel, Entity as TransactionEntity};
use common::{AppError, AppResult};
use domain::{NewTransaction, Transaction, TransactionType};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Transaction repository trait for dependency injection.
///
/// "Qualifying" means recurring with an amount strictly above `minimum`,
/// and `since <= occurred_at <= until`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Store a payment; `occurred_at` defaults to now
    async fn create(&self, transaction: NewTransaction) -> AppResult<Transaction>;

    /// Whether the email has any qualifying payment in the range
    async fn has_qualifying(
        &self,
        email: &str,
        minimum: Decimal,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// All qualifying payments in the range, oldest first
    async fn qualifying_between(
        &self,
        minimum: Decimal,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<Transaction>>;
}

/// Concrete implementation of TransactionRepository
pub struct TransactionStore {
    db: DatabaseConnection,
}

impl TransactionStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn qualifying(
    minimum: Decimal,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> sea_orm::Select<TransactionEntity> {
    TransactionEntity::find()
        .filter(transaction::Column::TransactionType.eq(TransactionType::Recurring.as_str()))
        .filter(transaction::Column::Amount.gt(minimum))
        .filter(transaction::Column::OccurredAt.gte(since))
        .filter(transaction::Column::OccurredAt.lte(until))
}

#[async_trait]
impl TransactionRepository for TransactionStore {
    async fn create(&self, transaction: NewTransaction) -> AppResult<Transaction> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(transaction.email),
            transaction_type: Set(transaction.kind.as_str().to_string()),
            amount: Set(transaction.amount),
            occurred_at: Set(transaction.occurred_at.unwrap_or_else(Utc::now)),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Transaction::try_from(model)?)
    }

    async fn has_qualifying(
        &self,
        email: &str,
        minimum: Decimal,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<bool> {
        let count = qualifying(minimum, since, until)
            .filter(transaction::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn qualifying_between(
        &self,
        minimum: Decimal,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<Transaction>> {
        qualifying(minimum, since, until)
            .order_by_asc(transaction::Column::OccurredAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(|model| Transaction::try_from(model).map_err(AppError::from))
            .collect()
    }
}
