//! User handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{SubscriptionSummary, UserResponse};

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Registration request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Email address, matched against payment records
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "drummer@example.com")]
    pub email: String,
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Sam Rivera")]
    pub name: String,
}

/// Register a user with the member role
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .subscriptions
        .register_user(payload.email, payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Sustaining status and free hours (own account or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/subscription",
    tag = "Users",
    security(("actor" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Subscription summary", body = SubscriptionSummary),
        (status = 401, description = "Missing or unknown acting user"),
        (status = 403, description = "Forbidden - own account unless admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_subscription(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubscriptionSummary>> {
    if !current_user.may_view(id) {
        return Err(AppError::Forbidden);
    }

    let user = if current_user.id() == id {
        current_user.0
    } else {
        state.subscriptions.get_user(id).await?
    };

    let summary = state.subscriptions.subscription_summary(&user).await?;
    Ok(Json(summary))
}
