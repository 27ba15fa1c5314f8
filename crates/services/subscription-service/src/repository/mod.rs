//! Repository layer for data access.

pub mod entities;
mod reservation_repository;
mod role_store;
mod transaction_repository;
mod user_repository;

pub use reservation_repository::{ReservationRepository, ReservationStore};
pub use role_store::{RoleStore, UserRoleStore};
pub use transaction_repository::{TransactionRepository, TransactionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use reservation_repository::MockReservationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_store::MockRoleStore;
#[cfg(any(test, feature = "test-utils"))]
pub use transaction_repository::MockTransactionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
