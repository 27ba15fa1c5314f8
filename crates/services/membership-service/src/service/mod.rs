//! Service layer - business logic.

mod membership_service;

pub use membership_service::{MembershipManager, MembershipService};
