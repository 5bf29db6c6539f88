#![allow(unused_imports)]
#![allow(dead_code)]
pub mod fakes;

pub use fakes::*;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use deskbook::api::build_router;
use deskbook::config::Config;
use deskbook::models::{
    AvailabilityBlock, BlockProducto, FlowSession, FlowShape, ProductKind, ProductoRecord, Room,
    VisitorContact,
};
use deskbook::services::booking_api::BookingApi;
use deskbook::services::payments::PaymentsGateway;
use deskbook::services::{
    AvailabilityService, CatalogService, CheckoutService, FlowService,
};
use deskbook::AppState;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn producto(name: &str, tipo: &str) -> ProductoRecord {
    ProductoRecord {
        name: Some(name.to_string()),
        tipo: Some(tipo.to_string()),
        center_code: Some("MA1".to_string()),
        ..Default::default()
    }
}

pub fn producto_priced(name: &str, tipo: &str, price: f64) -> ProductoRecord {
    let mut record = producto(name, tipo);
    record.price_from = Some(price);
    record
}

/// MA1A1 meeting room at 35 EUR/h.
pub fn meeting_room() -> Room {
    Room::from_producto(&producto_priced("MA1A1", "aula", 35.0), None).unwrap()
}

/// The aggregated desk fleet room.
pub fn desk_room() -> Room {
    Room::from_producto(&producto("MA1 Desks", "mesa"), None).unwrap()
}

pub fn block(product: &str, from: &str, to: &str) -> AvailabilityBlock {
    AvailabilityBlock {
        id: Some(serde_json::json!(42)),
        fecha_ini: from.parse().expect("bad fecha_ini in test block"),
        fecha_fin: to.parse().expect("bad fecha_fin in test block"),
        producto: Some(BlockProducto {
            nombre: Some(product.to_string()),
        }),
        cliente: None,
        estado: Some("Created".to_string()),
    }
}

pub fn contact() -> VisitorContact {
    VisitorContact {
        first_name: "Ana".to_string(),
        last_name: "Ruiz".to_string(),
        email: "ana.ruiz@example.com".to_string(),
        phone: "+34 600 000 000".to_string(),
        company: String::new(),
    }
}

/// Flow session parked on the payment step with a priced two-hour schedule
/// (09:00-11:00, so 70.00 net at the standard 35/h room).
pub fn hourly_payment_session() -> FlowSession {
    let mut session = FlowSession::new("ma1a1".to_string(), FlowShape::Standard, date(2024, 6, 18));
    session.schedule.start_time = Some("09:00".to_string());
    session.schedule.end_time = Some("11:00".to_string());
    session.schedule.attendees = 2;
    session.contact = Some(contact());
    session.billing = Some(Default::default());
    session.active_step = 2;
    session
}

/// Desk subscription draft: three months starting July, desk 3 picked.
pub fn desk_subscription_session() -> FlowSession {
    let mut session =
        FlowSession::new("ma1-desks".to_string(), FlowShape::Standard, date(2024, 7, 1));
    session.schedule.booking_type = Some(deskbook::models::BookingType::Month);
    session.schedule.duration_months = Some(3);
    session.schedule.date = date(2024, 7, 1);
    session.schedule.date_to = Some(date(2024, 9, 30));
    session.schedule.start_time = Some("00:00".to_string());
    session.schedule.end_time = Some("23:59".to_string());
    session.schedule.desk_product_name = Some("MA1O1-3".to_string());
    session.contact = Some(contact());
    session.billing = Some(Default::default());
    session.active_step = 2;
    session
}

pub fn test_config(payments: bool) -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        booking_api_base_url: "http://localhost:8080/api".to_string(),
        booking_center_code: "MA1".to_string(),
        payments_base_url: payments.then(|| "http://localhost:9000".to_string()),
        stripe_publishable_key: payments.then(|| "pk_test_123".to_string()),
        stripe_tenant: "default".to_string(),
        http_timeout_secs: 10,
        availability_cache_secs: 20,
        flow_session_ttl_minutes: 60,
    }
}

/// Application state wired to fakes instead of HTTP clients.
pub fn build_state(
    api: Arc<FakeBookingApi>,
    payments: Option<Arc<FakePaymentsGateway>>,
) -> AppState {
    let booking_api = api as Arc<dyn BookingApi>;
    let payments_gateway = payments.map(|gateway| gateway as Arc<dyn PaymentsGateway>);
    let config = test_config(payments_gateway.is_some());

    AppState {
        config,
        booking_api: booking_api.clone(),
        catalog_service: CatalogService::new(booking_api.clone(), "MA1".to_string()),
        availability_service: AvailabilityService::new(
            booking_api.clone(),
            "MA1".to_string(),
            Duration::from_secs(20),
        ),
        flow_service: FlowService::new(Duration::from_secs(3600)),
        checkout_service: CheckoutService::new(
            booking_api,
            payments_gateway,
            "default".to_string(),
            "MA1".to_string(),
        ),
    }
}

pub fn build_app(
    api: Arc<FakeBookingApi>,
    payments: Option<Arc<FakePaymentsGateway>>,
) -> Router {
    build_router(build_state(api, payments))
}

/// Drive one request through the router and decode the response. Non-JSON
/// bodies come back as a JSON string value.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    request(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, Method::POST, uri, None, None).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::PATCH, uri, None, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::PUT, uri, None, Some(body)).await
}
