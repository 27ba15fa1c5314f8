//! Membership Service Library
//!
//! Band creation and the invite / accept / decline workflow. The service is
//! embedded in the gateway process and shares its database connection.

pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::repository::{BandStore, MembershipStore};
use crate::service::MembershipManager;

pub use crate::infra::Migrator;
pub use crate::service::MembershipService;

/// Build the membership service over a database connection.
pub fn build_service(db: DatabaseConnection) -> Arc<dyn MembershipService> {
    let bands = Arc::new(BandStore::new(db.clone()));
    let memberships = Arc::new(MembershipStore::new(db));
    Arc::new(MembershipManager::new(bands, memberships))
}
