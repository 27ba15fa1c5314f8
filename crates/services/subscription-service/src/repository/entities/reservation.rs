//! Reservation entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Reservation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub reserved_at: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub hours_used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub free_hours_used: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Reservation {
    fn from(model: Model) -> Self {
        Reservation {
            id: model.id,
            user_id: model.user_id,
            reserved_at: model.reserved_at,
            hours_used: model.hours_used,
            free_hours_used: model.free_hours_used,
            cost: model.cost,
        }
    }
}
