//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::band_handler::CreateBandRequest;
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::invitation_handler::InviteRequest;
use crate::handlers::subscription_handler::{ReservationRequest, TransactionRequest};
use crate::handlers::user_handler::RegisterRequest;
use crate::middleware::ACTOR_HEADER;
use domain::{
    Band, BandRole, Membership, MembershipStatus, Reservation, Role, SubscriptionStats,
    SubscriptionSummary, Transaction, TransactionOutcome, TransactionType, UserResponse,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::user_handler::register_user,
        crate::handlers::user_handler::get_subscription,
        crate::handlers::band_handler::create_band,
        crate::handlers::band_handler::get_band,
        crate::handlers::band_handler::list_members,
        crate::handlers::invitation_handler::invite_member,
        crate::handlers::invitation_handler::accept_invitation,
        crate::handlers::invitation_handler::decline_invitation,
        crate::handlers::invitation_handler::pending_invitations,
        crate::handlers::subscription_handler::record_transaction,
        crate::handlers::subscription_handler::record_reservation,
        crate::handlers::subscription_handler::subscription_stats,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
            RegisterRequest,
            UserResponse,
            Role,
            SubscriptionSummary,
            CreateBandRequest,
            Band,
            InviteRequest,
            BandRole,
            Membership,
            MembershipStatus,
            TransactionRequest,
            TransactionType,
            Transaction,
            TransactionOutcome,
            ReservationRequest,
            Reservation,
            SubscriptionStats,
        )
    ),
    modifiers(&ActorHeaderAddon),
    tags(
        (name = "Health", description = "Liveness and dependency checks"),
        (name = "Users", description = "Registration and per-user subscription view"),
        (name = "Bands", description = "Band creation and rosters"),
        (name = "Invitations", description = "Invite, accept and decline"),
        (name = "Subscriptions", description = "Payments, free hours and statistics"),
    )
)]
pub struct ApiDoc;

/// Documents the acting-user header as an API key.
struct ActorHeaderAddon;

impl Modify for ActorHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "actor",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ACTOR_HEADER))),
            );
        }
    }
}
