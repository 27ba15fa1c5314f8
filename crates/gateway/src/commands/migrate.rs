//! Migrate command - schema management for both services.
//!
//! Users live in the subscription schema, so it is migrated first and
//! rolled back last.

use common::{AppResult, Database};
use membership_service_lib::Migrator as MembershipMigrator;
use subscription_service_lib::Migrator as SubscriptionMigrator;
use tracing::{info, warn};

use crate::cli::{MigrateAction, MigrateArgs};
use crate::config::GatewayConfig;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: GatewayConfig) -> AppResult<()> {
    let db = Database::connect(&config.database).await?;
    run(&db, args.action).await
}

/// Apply a migration action across both services' migrators
pub async fn run(db: &Database, action: MigrateAction) -> AppResult<()> {
    match action {
        MigrateAction::Up => {
            info!("Running pending migrations...");
            db.run_migrations::<SubscriptionMigrator>().await?;
            db.run_migrations::<MembershipMigrator>().await?;
            info!("Migrations completed successfully");
        }
        MigrateAction::Down => {
            info!("Rolling back last migrations...");
            db.rollback_migration::<MembershipMigrator>().await?;
            db.rollback_migration::<SubscriptionMigrator>().await?;
            info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            for (service, status) in [
                ("subscription", db.migration_status::<SubscriptionMigrator>().await?),
                ("membership", db.migration_status::<MembershipMigrator>().await?),
            ] {
                for (name, applied) in status {
                    let state = if applied { "applied" } else { "pending" };
                    println!("{service} {name}: {state}");
                }
            }
        }
        MigrateAction::Fresh => {
            warn!("Resetting database and running all migrations...");
            // fresh drops every table, including the other migrator's
            db.fresh_migrations::<SubscriptionMigrator>().await?;
            db.run_migrations::<MembershipMigrator>().await?;
            info!("Fresh migrations completed successfully");
        }
    }

    Ok(())
}
