//! HTTP request handlers.

pub mod band_handler;
pub mod health_handler;
pub mod invitation_handler;
pub mod subscription_handler;
pub mod user_handler;

pub use health_handler::health_routes;
