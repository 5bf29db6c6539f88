use crate::api;
use crate::api::middleware::{require_bearer, AppState};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Request bodies are small JSON documents; anything bigger is noise.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Internal routes forward the caller's bearer token to the booking API.
    let protected = Router::new()
        .route("/api/profile", get(api::profile::get_profile))
        .route(
            "/api/admin/lookups/contacts",
            get(api::admin::search_contacts),
        )
        .route("/api/admin/lookups/centros", get(api::admin::list_centros))
        .route(
            "/api/admin/lookups/productos",
            get(api::admin::list_productos),
        )
        .route(
            "/api/admin/reservations",
            post(api::admin::create_reservation),
        )
        .route("/api/admin/blocks/:id", put(api::admin::update_block))
        .layer(axum::middleware::from_fn(require_bearer));

    // Public routes: catalog, availability and the visitor booking flow.
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/rooms", get(api::rooms::list_rooms))
        .route("/api/rooms/:key", get(api::rooms::get_room))
        .route("/api/rooms/:key/grid", get(api::rooms::room_grid))
        .route("/api/rooms/:key/desks", get(api::rooms::room_desks))
        .route("/api/payments/config", get(api::payments::payments_config))
        .route("/api/flows", post(api::flows::create_flow))
        .route("/api/flows/:id", get(api::flows::get_flow))
        .route("/api/flows/:id/next", post(api::flows::next_step))
        .route("/api/flows/:id/prev", post(api::flows::prev_step))
        .route("/api/flows/:id/step", post(api::flows::jump_step))
        .route("/api/flows/:id/reset", post(api::flows::reset_flow))
        .route("/api/flows/:id/mode", post(api::flows::choose_mode))
        .route("/api/flows/:id/schedule", patch(api::flows::update_schedule))
        .route("/api/flows/:id/contact", put(api::flows::set_contact))
        .route("/api/flows/:id/quote", get(api::flows::get_quote))
        .route(
            "/api/flows/:id/checkout/begin",
            post(api::flows::begin_checkout),
        )
        .route(
            "/api/flows/:id/checkout/complete",
            post(api::flows::complete_checkout),
        )
        .merge(protected)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        // The widget is embedded on the marketing site, a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
