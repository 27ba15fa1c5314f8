//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! All types here are shared between the membership and subscription services
//! and the gateway.

pub mod band;
pub mod constants;
pub mod error;
pub mod subscription;
pub mod user;

pub use band::{Band, BandRole, CreateBand, Membership, MembershipStatus};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use subscription::{
    current_period_start, is_in_current_period, next_period_start, NewReservation,
    NewTransaction, Reservation, SubscriptionPolicy, SubscriptionStats, SubscriptionSummary,
    Transaction, TransactionOutcome, TransactionType,
};
pub use user::{Capability, Role, User, UserResponse};
