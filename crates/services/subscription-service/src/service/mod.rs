//! Service layer - business logic.

mod subscription_service;

pub use subscription_service::{SubscriptionManager, SubscriptionService};
