//! Subscription Service Library
//!
//! Users and roles, payment processing, sustaining-member upgrades and
//! free-hour accounting. Embedded in the gateway process.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use domain::SubscriptionPolicy;
use sea_orm::DatabaseConnection;

use crate::repository::{ReservationStore, TransactionStore, UserRoleStore, UserStore};
use crate::service::SubscriptionManager;

pub use crate::config::SubscriptionConfig;
pub use crate::infra::Migrator;
pub use crate::service::SubscriptionService;

/// Build the subscription service over a database connection.
pub fn build_service(db: DatabaseConnection, policy: SubscriptionPolicy) -> Arc<dyn SubscriptionService> {
    let users = Arc::new(UserStore::new(db.clone()));
    let roles = Arc::new(UserRoleStore::new(db.clone()));
    let transactions = Arc::new(TransactionStore::new(db.clone()));
    let reservations = Arc::new(ReservationStore::new(db));
    Arc::new(SubscriptionManager::new(users, roles, transactions, reservations, policy))
}
