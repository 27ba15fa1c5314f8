//! Common utilities shared across the services and the gateway.
//!
//! This crate provides:
//! - Unified error handling with HTTP conversion
//! - Configuration structures
//! - The shared database handle (`database` feature)

pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod error;

pub use config::*;
#[cfg(feature = "database")]
pub use database::Database;
pub use error::{AppError, AppResult, OptionExt};
