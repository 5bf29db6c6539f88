use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiResult, AppState, BearerToken};
use crate::models::{CentroRecord, ProductoRecord, ReservationDraft};

#[derive(Debug, Deserialize)]
pub struct ContactSearchQuery {
    #[serde(default)]
    pub search: String,
}

/// Contact typeahead for the reservation dialog; results pass through as the
/// booking API returns them.
pub async fn search_contacts(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<ContactSearchQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let contacts = state
        .booking_api
        .search_contacts(query.search.trim(), &token.0)
        .await?;
    Ok(Json(contacts))
}

pub async fn list_centros(State(state): State<AppState>) -> ApiResult<Json<Vec<CentroRecord>>> {
    Ok(Json(state.booking_api.centros().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductosQuery {
    pub center_code: Option<String>,
}

pub async fn list_productos(
    State(state): State<AppState>,
    Query(query): Query<ProductosQuery>,
) -> ApiResult<Json<Vec<ProductoRecord>>> {
    let center_code = query
        .center_code
        .unwrap_or_else(|| state.config.booking_center_code.clone());
    Ok(Json(state.booking_api.productos(&center_code).await?))
}

/// Create a reservation from the internal dialog. Drafts are validated here
/// with the same rules the dialog enforces before the payload goes upstream.
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Json(draft): Json<ReservationDraft>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    draft.validate().map_err(ApiError::BadRequest)?;
    let created = state
        .booking_api
        .create_reservation(&draft.to_payload(), &token.0)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an availability block (drag/resize in the internal calendar). The
/// payload passes through untouched.
pub async fn update_block(
    State(state): State<AppState>,
    Path(block_id): Path<String>,
    Extension(token): Extension<BearerToken>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = state
        .booking_api
        .update_block(&block_id, &payload, &token.0)
        .await?;
    Ok(Json(updated))
}
