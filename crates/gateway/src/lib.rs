//! Collective gateway library
//!
//! HTTP API and CLI commands over the membership and subscription services,
//! which run embedded in this process on one database.

pub mod cli;
pub mod commands;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use crate::config::GatewayConfig;
pub use crate::routes::create_router;
pub use crate::state::AppState;
