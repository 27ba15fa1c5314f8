//! Band handlers.

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
use domain::{Band, CreateBand, Membership};

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBandRequest {
    #[validate(length(min = 1, max = 100, message = "Band name must be between 1 and 100 characters"))]
    #[schema(example = "The Basement Tapes")]
    pub name: String,
    #[schema(example = "Garage rock, Thursdays in room B")]
    pub bio: Option<String>,
}

/// Create a band; the caller becomes its admin
#[utoipa::path(
    post,
    path = "/bands",
    tag = "Bands",
    security(("actor" = [])),
    request_body = CreateBandRequest,
    responses(
        (status = 201, description = "Band created", body = Band),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or unknown acting user")
    )
)]
pub async fn create_band(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBandRequest>,
) -> AppResult<(StatusCode, Json<Band>)> {
    let band = state
        .memberships
        .create_band(
            current_user.user(),
            CreateBand {
                name: payload.name,
                bio: payload.bio,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(band)))
}

#[utoipa::path(
    get,
    path = "/bands/{id}",
    tag = "Bands",
    params(
        ("id" = Uuid, Path, description = "Band ID")
    ),
    responses(
        (status = 200, description = "Band", body = Band),
        (status = 404, description = "Band not found")
    )
)]
pub async fn get_band(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Band>> {
    Ok(Json(state.memberships.get_band(id).await?))
}

/// Active members of a band
#[utoipa::path(
    get,
    path = "/bands/{id}/members",
    tag = "Bands",
    params(
        ("id" = Uuid, Path, description = "Band ID")
    ),
    responses(
        (status = 200, description = "Active memberships", body = Vec<Membership>),
        (status = 404, description = "Band not found")
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Membership>>> {
    Ok(Json(state.memberships.active_members(id).await?))
}
