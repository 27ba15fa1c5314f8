//! Migration: Create band_members table.

use sea_orm_migration::prelude::*;

use super::m20241001_000001_create_bands_table::Bands;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BandMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BandMembers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BandMembers::BandId).uuid().not_null())
                    .col(ColumnDef::new(BandMembers::UserId).uuid().not_null())
                    .col(ColumnDef::new(BandMembers::Role).string_len(16).not_null())
                    .col(ColumnDef::new(BandMembers::Instrument).string_len(100).null())
                    .col(ColumnDef::new(BandMembers::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(BandMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BandMembers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_band_members_band_id")
                            .from(BandMembers::Table, BandMembers::BandId)
                            .to(Bands::Table, Bands::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership per (band, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_band_members_band_user")
                    .table(BandMembers::Table)
                    .col(BandMembers::BandId)
                    .col(BandMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Pending-invitation lookups filter by user and status
        manager
            .create_index(
                Index::create()
                    .name("idx_band_members_user_status")
                    .table(BandMembers::Table)
                    .col(BandMembers::UserId)
                    .col(BandMembers::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BandMembers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BandMembers {
    Table,
    Id,
    BandId,
    UserId,
    Role,
    Instrument,
    Status,
    CreatedAt,
    UpdatedAt,
}
