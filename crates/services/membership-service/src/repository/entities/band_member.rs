//! Band membership database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Membership};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "band_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub band_id: Uuid,
    pub user_id: Uuid,
    /// "admin" or "member"
    pub role: String,
    pub instrument: Option<String>,
    /// "invited", "active" or "declined"
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::band::Entity",
        from = "Column::BandId",
        to = "super::band::Column::Id",
        on_delete = "Cascade"
    )]
    Band,
}

impl Related<super::band::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Band.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for Membership {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: model.id,
            band_id: model.band_id,
            user_id: model.user_id,
            role: model.role.parse()?,
            instrument: model.instrument,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Build an insertable row from a domain membership
impl From<Membership> for ActiveModel {
    fn from(membership: Membership) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(membership.id),
            band_id: Set(membership.band_id),
            user_id: Set(membership.user_id),
            role: Set(membership.role.as_str().to_string()),
            instrument: Set(membership.instrument),
            status: Set(membership.status.as_str().to_string()),
            created_at: Set(membership.created_at),
            updated_at: Set(membership.updated_at),
        }
    }
}
