//! Invitation workflow handlers.
//!
//! Accept and decline always act for the caller; nobody answers an
//! invitation on someone else's behalf.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{Band, BandRole, Membership};

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteRequest {
    /// User being invited
    pub user_id: Uuid,
    /// Defaults to member
    #[serde(default)]
    pub role: Option<BandRole>,
    #[validate(length(max = 50, message = "Instrument must be at most 50 characters"))]
    #[schema(example = "bass")]
    pub instrument: Option<String>,
}

/// Invite a user (band admins and site admins)
#[utoipa::path(
    post,
    path = "/bands/{id}/invitations",
    tag = "Invitations",
    security(("actor" = [])),
    params(
        ("id" = Uuid, Path, description = "Band ID")
    ),
    request_body = InviteRequest,
    responses(
        (status = 201, description = "Invitation created", body = Membership),
        (status = 403, description = "Caller cannot manage this band"),
        (status = 404, description = "Band or invitee not found"),
        (status = 409, description = "Already a member or invited")
    )
)]
pub async fn invite_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(band_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<InviteRequest>,
) -> AppResult<(StatusCode, Json<Membership>)> {
    // Unauthorized callers never reach the invitee lookup
    let band = state
        .memberships
        .authorize_management(current_user.user(), band_id)
        .await?;
    // membership rows do not reference the users table
    let invitee = state.subscriptions.get_user(payload.user_id).await?;

    let membership = state
        .memberships
        .invite_member(
            current_user.user(),
            band.id,
            invitee.id,
            payload.role.unwrap_or(BandRole::Member),
            payload.instrument,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

#[utoipa::path(
    post,
    path = "/bands/{id}/invitations/accept",
    tag = "Invitations",
    security(("actor" = [])),
    params(
        ("id" = Uuid, Path, description = "Band ID")
    ),
    responses(
        (status = 200, description = "Now an active member", body = Membership),
        (status = 404, description = "User has not been invited to this band")
    )
)]
pub async fn accept_invitation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(band_id): Path<Uuid>,
) -> AppResult<Json<Membership>> {
    let membership = state
        .memberships
        .accept_invitation(band_id, current_user.id())
        .await?;
    Ok(Json(membership))
}

#[utoipa::path(
    post,
    path = "/bands/{id}/invitations/decline",
    tag = "Invitations",
    security(("actor" = [])),
    params(
        ("id" = Uuid, Path, description = "Band ID")
    ),
    responses(
        (status = 200, description = "Invitation declined", body = Membership),
        (status = 404, description = "User has not been invited to this band")
    )
)]
pub async fn decline_invitation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(band_id): Path<Uuid>,
) -> AppResult<Json<Membership>> {
    let membership = state
        .memberships
        .decline_invitation(band_id, current_user.id())
        .await?;
    Ok(Json(membership))
}

/// Bands the caller has been invited to and not answered
#[utoipa::path(
    get,
    path = "/me/invitations",
    tag = "Invitations",
    security(("actor" = [])),
    responses(
        (status = 200, description = "Bands with pending invitations", body = Vec<Band>),
        (status = 401, description = "Missing or unknown acting user")
    )
)]
pub async fn pending_invitations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Band>>> {
    let bands = state
        .memberships
        .pending_invitations(current_user.id())
        .await?;
    Ok(Json(bands))
}
