//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod reservation;
pub mod transaction;
pub mod user;
pub mod user_role;
