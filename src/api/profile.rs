use axum::{extract::State, Extension, Json};

use crate::api::middleware::{ApiResult, AppState, BearerToken};
use crate::models::ContactPrefill;

/// Profile of the signed-in user, shaped for prefilling the contact step.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> ApiResult<Json<ContactPrefill>> {
    let user = state.booking_api.current_user(&token.0).await?;
    Ok(Json(user.to_prefill()))
}
