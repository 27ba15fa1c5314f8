//! Request middleware.

mod actor;

pub use actor::{actor_middleware, require_capability, CurrentUser, ACTOR_HEADER};
