use crate::api::middleware::error::ApiError;
use crate::config::Config;
use crate::services::booking_api::BookingApi;
use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_api: Arc<dyn BookingApi>,
    pub catalog_service: crate::services::CatalogService,
    pub availability_service: crate::services::AvailabilityService,
    pub flow_service: crate::services::FlowService,
    pub checkout_service: crate::services::CheckoutService,
}

/// Bearer token forwarded verbatim to the booking API. This service issues no
/// tokens of its own; the remote API validates them.
#[derive(Clone)]
pub struct BearerToken(pub String);

/// Require an `Authorization: Bearer` header and stash the token for the
/// handler. Used by the admin passthrough routes and the profile lookup.
pub async fn require_bearer(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}
