use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::middleware::AppState;
use crate::services::checkout::PAYMENTS_DISABLED_MESSAGE;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsConfigResponse {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishable_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Publishable payment settings for the client SDK. Secrets never leave the
/// server; when payments are not configured the response carries the notice
/// shown in place of the card form.
pub async fn payments_config(State(state): State<AppState>) -> Json<PaymentsConfigResponse> {
    let enabled = state.config.payments_enabled();
    Json(PaymentsConfigResponse {
        enabled,
        publishable_key: if enabled {
            state.config.stripe_publishable_key.clone()
        } else {
            None
        },
        message: (!enabled).then(|| PAYMENTS_DISABLED_MESSAGE.to_string()),
    })
}
