//! Acting-user middleware.
//!
//! Authentication is handled upstream; the gateway trusts the `x-user-id`
//! header and loads that user for the handlers.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Capability, Role, User};

use crate::state::AppState;

/// Header carrying the acting user's ID
pub const ACTOR_HEADER: &str = "x-user-id";

/// User on whose behalf the request runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn user(&self) -> &User {
        &self.0
    }

    /// Site admins, or the user themselves
    pub fn may_view(&self, user_id: Uuid) -> bool {
        self.0.id == user_id || self.0.has_role(Role::Admin)
    }
}

/// Reject users whose roles do not grant the capability.
pub fn require_capability(user: &CurrentUser, capability: Capability) -> AppResult<()> {
    if user.0.can(capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Resolve the acting user and insert it into request extensions.
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let actor_id = extract_actor_id(&request)?;

    let user = match state.subscriptions.get_user(actor_id).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            debug!(%actor_id, "Unknown acting user");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn extract_actor_id(request: &Request<Body>) -> AppResult<Uuid> {
    request
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(roles: Vec<Role>) -> CurrentUser {
        let mut user = User::new(Uuid::new_v4(), "a@example.com".into(), "A".into());
        for role in roles {
            user.grant_role(role);
        }
        CurrentUser(user)
    }

    #[test]
    fn stats_require_admin() {
        assert!(require_capability(&user_with(vec![Role::Member]), Capability::ViewSubscriptionStats).is_err());
        assert!(require_capability(&user_with(vec![Role::Admin]), Capability::ViewSubscriptionStats).is_ok());
    }

    #[test]
    fn users_may_view_themselves_only() {
        let member = user_with(vec![Role::Member]);
        assert!(member.may_view(member.id()));
        assert!(!member.may_view(Uuid::new_v4()));
        assert!(user_with(vec![Role::Admin]).may_view(Uuid::new_v4()));
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert!(matches!(extract_actor_id(&request), Err(AppError::Unauthorized)));

        let request = Request::builder()
            .header(ACTOR_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        assert!(matches!(extract_actor_id(&request), Err(AppError::Unauthorized)));
    }
}
