//! Payments, reservations and subscription statistics.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::{
    Capability, NewReservation, NewTransaction, Reservation, SubscriptionStats, TransactionOutcome,
    TransactionType,
};

use crate::extractors::ValidatedJson;
use crate::middleware::{require_capability, CurrentUser};
use crate::state::AppState;

/// Payment notification
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransactionRequest {
    /// Payer email; may not belong to a registered user yet
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "drummer@example.com")]
    pub email: String,
    pub kind: TransactionType,
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
    /// Defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
}

impl From<TransactionRequest> for NewTransaction {
    fn from(req: TransactionRequest) -> Self {
        Self {
            email: req.email,
            kind: req.kind,
            amount: req.amount,
            occurred_at: req.occurred_at,
        }
    }
}

/// Room usage by the caller
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReservationRequest {
    /// Defaults to now
    pub reserved_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, example = "3")]
    pub hours_used: Decimal,
    #[serde(default)]
    #[schema(value_type = String, example = "2.5")]
    pub free_hours_used: Decimal,
    #[serde(default)]
    #[schema(value_type = String, example = "7.50")]
    pub cost: Decimal,
}

impl From<ReservationRequest> for NewReservation {
    fn from(req: ReservationRequest) -> Self {
        Self {
            reserved_at: req.reserved_at,
            hours_used: req.hours_used,
            free_hours_used: req.free_hours_used,
            cost: req.cost,
        }
    }
}

/// Record a payment and upgrade the payer when it qualifies (site admins)
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "Subscriptions",
    security(("actor" = [])),
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Payment stored", body = TransactionOutcome),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or unknown acting user"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn record_transaction(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TransactionRequest>,
) -> AppResult<(StatusCode, Json<TransactionOutcome>)> {
    require_capability(&current_user, Capability::RecordPayments)?;
    let outcome = state
        .subscriptions
        .record_transaction(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Record a reservation against the caller's free hours
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "Subscriptions",
    security(("actor" = [])),
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation stored", body = Reservation),
        (status = 400, description = "Invalid quantities or free hours exhausted"),
        (status = 401, description = "Missing or unknown acting user")
    )
)]
pub async fn record_reservation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ReservationRequest>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state
        .subscriptions
        .record_reservation(current_user.user(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Collective-wide subscription snapshot (site admins)
#[utoipa::path(
    get,
    path = "/subscriptions/stats",
    tag = "Subscriptions",
    security(("actor" = [])),
    responses(
        (status = 200, description = "Subscription statistics", body = SubscriptionStats),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn subscription_stats(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<SubscriptionStats>> {
    require_capability(&current_user, Capability::ViewSubscriptionStats)?;
    Ok(Json(state.subscriptions.subscription_stats().await?))
}
