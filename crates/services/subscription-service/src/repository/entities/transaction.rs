//! Payment transaction entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Transaction};

/// Not linked to users by key: payments are matched by email so they can
/// arrive before the payer registers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    /// "recurring" or "one-time"
    pub transaction_type: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for Transaction {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: model.id,
            email: model.email,
            kind: model.transaction_type.parse()?,
            amount: model.amount,
            occurred_at: model.occurred_at,
        })
    }
}
