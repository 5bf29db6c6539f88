use crate::api::middleware::AppState;
use crate::config::Config;
use crate::services::booking_api::{BookingApi, HttpBookingApi};
use crate::services::payments::{HttpPaymentsGateway, PaymentsGateway};
use crate::services::{AvailabilityService, CatalogService, CheckoutService, FlowService};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

pub async fn build_app_state(config: Config) -> anyhow::Result<AppState> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Failed to build the shared HTTP client")?;

    let booking_api = Arc::new(HttpBookingApi::new(
        client.clone(),
        config.booking_api_base_url.clone(),
    )) as Arc<dyn BookingApi>;
    tracing::info!(
        "Booking API client initialized ({})",
        config.booking_api_base_url
    );

    // The payments gateway only exists when both halves of its config do;
    // without it the checkout degrades instead of failing.
    let payments = match (&config.payments_base_url, &config.stripe_publishable_key) {
        (Some(base_url), Some(_)) => {
            tracing::info!("Payments gateway initialized ({})", base_url);
            Some(Arc::new(HttpPaymentsGateway::new(client, base_url.clone()))
                as Arc<dyn PaymentsGateway>)
        }
        _ => None,
    };

    let catalog_service =
        CatalogService::new(booking_api.clone(), config.booking_center_code.clone());
    let availability_service = AvailabilityService::new(
        booking_api.clone(),
        config.booking_center_code.clone(),
        Duration::from_secs(config.availability_cache_secs),
    );
    let flow_service = FlowService::new(Duration::from_secs(
        config.flow_session_ttl_minutes.max(1) as u64 * 60,
    ));
    let checkout_service = CheckoutService::new(
        booking_api.clone(),
        payments,
        config.stripe_tenant.clone(),
        config.booking_center_code.clone(),
    );
    tracing::info!("Services initialized");

    // Warm the catalog. Failure is not fatal; every handler loads it lazily
    // on first use.
    if let Err(err) = catalog_service.refresh().await {
        tracing::warn!("Catalog warmup failed, will retry on first request: {}", err);
    }

    Ok(AppState {
        config,
        booking_api,
        catalog_service,
        availability_service,
        flow_service,
        checkout_service,
    })
}
