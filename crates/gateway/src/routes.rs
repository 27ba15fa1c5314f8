//! Route configuration.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    band_handler, health_routes, invitation_handler, subscription_handler, user_handler,
};
use crate::middleware::actor_middleware;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no actor)
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes())
        .merge(actor_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            actor_middleware,
        )))
        .with_state(state)
}

/// Registration and read-only band pages
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(user_handler::register_user))
        .route("/bands/:id", get(band_handler::get_band))
        .route("/bands/:id/members", get(band_handler::list_members))
}

/// Routes that act on behalf of the `x-user-id` user
fn actor_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/subscription", get(user_handler::get_subscription))
        .route("/bands", post(band_handler::create_band))
        .route("/bands/:id/invitations", post(invitation_handler::invite_member))
        .route(
            "/bands/:id/invitations/accept",
            post(invitation_handler::accept_invitation),
        )
        .route(
            "/bands/:id/invitations/decline",
            post(invitation_handler::decline_invitation),
        )
        .route("/me/invitations", get(invitation_handler::pending_invitations))
        .route("/transactions", post(subscription_handler::record_transaction))
        .route("/reservations", post(subscription_handler::record_reservation))
        .route("/subscriptions/stats", get(subscription_handler::subscription_stats))
}
