//! Database migrations for users, roles, payments and reservations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20241001_000001_create_users_table;
mod m20241001_000002_create_user_roles_table;
mod m20241001_000003_create_transactions_table;
mod m20241001_000004_create_reservations_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_users_table::Migration),
            Box::new(m20241001_000002_create_user_roles_table::Migration),
            Box::new(m20241001_000003_create_transactions_table::Migration),
            Box::new(m20241001_000004_create_reservations_table::Migration),
        ]
    }

    /// Separate bookkeeping table so this migrator can share a database
    fn migration_table_name() -> DynIden {
        Alias::new("subscription_migrations").into_iden()
    }
}
