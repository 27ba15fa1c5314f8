//! Application state for dependency injection.

use std::sync::Arc;

use common::Database;
use membership_service_lib::MembershipService;
use subscription_service_lib::SubscriptionService;

use crate::config::GatewayConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub memberships: Arc<dyn MembershipService>,
    pub subscriptions: Arc<dyn SubscriptionService>,
    /// Absent when the services run over in-memory stores
    pub database: Option<Database>,
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        memberships: Arc<dyn MembershipService>,
        subscriptions: Arc<dyn SubscriptionService>,
        database: Option<Database>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            memberships,
            subscriptions,
            database,
            config,
        }
    }
}
