//! Migration: Create bands table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bands::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bands::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Bands::Bio).text().null())
                    .col(
                        ColumnDef::new(Bands::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bands::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bands::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bands {
    Table,
    Id,
    Name,
    Bio,
    CreatedAt,
    UpdatedAt,
}
