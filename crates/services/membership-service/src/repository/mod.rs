//! Repository layer for data access.

pub mod entities;
mod band_repository;
mod membership_repository;

pub use band_repository::{BandRepository, BandStore};
pub use membership_repository::{MembershipRepository, MembershipStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use band_repository::MockBandRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use membership_repository::MockMembershipRepository;
