use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    models::{
        CheckoutState, ChooseModeRequest, ContactForm, CreateFlowRequest, FlowSnapshot,
        JumpStepRequest, QuoteResponse, Room, ScheduleUpdate,
    },
    services::checkout::{BeginResponse, CompleteRequest, CompleteResponse},
    services::pricing,
};

pub async fn create_flow(
    State(state): State<AppState>,
    Json(request): Json<CreateFlowRequest>,
) -> ApiResult<(StatusCode, Json<FlowSnapshot>)> {
    state.catalog_service.ensure_loaded().await?;
    let room = state
        .catalog_service
        .find(&request.room)
        .await
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let snapshot = state.flow_service.create(&room, request.shape).await;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.snapshot(id).await?))
}

pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.next_step(id).await?))
}

pub async fn prev_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.prev_step(id).await?))
}

pub async fn jump_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JumpStepRequest>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.jump_step(id, request.step).await?))
}

pub async fn reset_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.reset(id).await?))
}

pub async fn choose_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChooseModeRequest>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.choose_mode(id, request.mode).await?))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ScheduleUpdate>,
) -> ApiResult<Json<FlowSnapshot>> {
    let room = room_for_flow(&state, id).await?;
    Ok(Json(state.flow_service.update_schedule(id, &room, update).await?))
}

pub async fn set_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ContactForm>,
) -> ApiResult<Json<FlowSnapshot>> {
    Ok(Json(state.flow_service.set_contact(id, form).await?))
}

/// Price the current schedule. A schedule that cannot be priced yet (missing
/// or inverted times) is a 400, which the client renders as checkout
/// disabled.
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QuoteResponse>> {
    let snapshot = state.flow_service.snapshot(id).await?;
    let room = room_for_snapshot(&state, &snapshot).await?;
    let quote = pricing::quote_for(&room, &snapshot.schedule).ok_or_else(|| {
        ApiError::BadRequest("The schedule cannot be priced yet".to_string())
    })?;
    let waived = matches!(snapshot.checkout, CheckoutState::Finished { free: true, .. });
    Ok(Json(QuoteResponse::new(&quote, waived)))
}

/// Resolve the payment path for this flow: free quota, one-time intent, or
/// subscription setup. The session lock is held across the remote calls so
/// payment-affecting requests for one draft never interleave.
pub async fn begin_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BeginResponse>> {
    let entry = state.flow_service.session(id).await?;
    let mut session = entry.lock().await;
    let room = state
        .catalog_service
        .find(&session.room_id)
        .await
        .ok_or_else(|| {
            ApiError::NotFound("Room for this booking flow no longer exists".to_string())
        })?;

    let response = state.checkout_service.begin(&mut session, &room).await?;
    session.touch();
    Ok(Json(response))
}

/// Finalize after the client confirmed the intent with the payment SDK.
pub async fn complete_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<CompleteRequest>>,
) -> ApiResult<Json<CompleteResponse>> {
    let Json(request) = request.unwrap_or_default();
    let entry = state.flow_service.session(id).await?;
    let mut session = entry.lock().await;
    let room = state
        .catalog_service
        .find(&session.room_id)
        .await
        .ok_or_else(|| {
            ApiError::NotFound("Room for this booking flow no longer exists".to_string())
        })?;

    let response = state
        .checkout_service
        .complete(&mut session, &room, request)
        .await?;
    session.touch();
    Ok(Json(response))
}

async fn room_for_flow(state: &AppState, id: Uuid) -> ApiResult<Room> {
    let snapshot = state.flow_service.snapshot(id).await?;
    room_for_snapshot(state, &snapshot).await
}

async fn room_for_snapshot(state: &AppState, snapshot: &FlowSnapshot) -> ApiResult<Room> {
    state
        .catalog_service
        .find(&snapshot.room)
        .await
        .ok_or_else(|| {
            ApiError::NotFound("Room for this booking flow no longer exists".to_string())
        })
}
