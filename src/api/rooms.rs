use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    models::{DeskAvailability, GridSlot, ProductKind, Room},
};

pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<Room>>> {
    state.catalog_service.ensure_loaded().await?;
    Ok(Json(state.catalog_service.rooms().await))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Room>> {
    state.catalog_service.ensure_loaded().await?;
    let room = state
        .catalog_service
        .find(&key)
        .await
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;
    Ok(Json(room))
}

#[derive(Deserialize)]
pub struct GridQuery {
    pub date: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub room: String,
    pub date: NaiveDate,
    pub slots: Vec<GridSlot>,
}

/// Day availability grid for one room: every half-hour slot classified as
/// available or occupied.
pub async fn room_grid(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GridQuery>,
) -> ApiResult<Json<GridResponse>> {
    state.catalog_service.ensure_loaded().await?;
    let room = state
        .catalog_service
        .find(&key)
        .await
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let slots = state.availability_service.day_grid(&room, query.date).await?;
    Ok(Json(GridResponse {
        room: room.slug,
        date: query.date,
        slots,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskQuery {
    pub date: NaiveDate,
    #[serde(default, alias = "date_to")]
    pub date_to: Option<NaiveDate>,
}

/// Free desk numbers for a period. Only valid for the desk fleet room.
pub async fn room_desks(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<DeskQuery>,
) -> ApiResult<Json<DeskAvailability>> {
    state.catalog_service.ensure_loaded().await?;
    let room = state
        .catalog_service
        .find(&key)
        .await
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;
    if room.kind != ProductKind::Desk {
        return Err(ApiError::BadRequest(
            "Desk availability only applies to the desk room".to_string(),
        ));
    }
    if let Some(date_to) = query.date_to {
        if date_to < query.date {
            return Err(ApiError::BadRequest(
                "End date must not be before the start date".to_string(),
            ));
        }
    }

    let desks = state
        .availability_service
        .free_desks(query.date, query.date_to)
        .await?;
    Ok(Json(desks))
}
