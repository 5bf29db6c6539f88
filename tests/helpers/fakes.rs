use async_trait::async_trait;
use chrono::NaiveDate;
use deskbook::models::{
    AvailabilityBlock, BookingConfirmation, CentroRecord, CurrentUser, ProductoRecord,
    PublicBookingRequest, UsageQuota,
};
use deskbook::services::booking_api::BookingApi;
use deskbook::services::payments::{
    PaymentIntentRequest, PaymentIntentResponse, PaymentsGateway, SetupIntentRequest,
    SetupIntentResponse, SubscriptionRequest, SubscriptionResponse,
};
use deskbook::{ApiError, ApiResult};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted booking API. Every upstream call is recorded so tests can assert
/// what went over the wire, and responses are whatever the test put in.
#[derive(Default)]
pub struct FakeBookingApi {
    pub blocks: Mutex<Vec<AvailabilityBlock>>,
    pub productos: Mutex<Vec<ProductoRecord>>,
    pub centros: Mutex<Vec<CentroRecord>>,
    /// `None` makes the quota probe fail with an upstream error.
    pub quota: Mutex<Option<UsageQuota>>,
    pub user: Mutex<Option<CurrentUser>>,
    pub fail_public_booking: Mutex<bool>,
    /// Applied inside `availability` before responding, for coalescing tests.
    pub availability_delay: Mutex<Option<Duration>>,

    pub availability_calls: AtomicUsize,
    pub productos_calls: AtomicUsize,
    pub public_bookings: Mutex<Vec<PublicBookingRequest>>,
    pub reservations: Mutex<Vec<serde_json::Value>>,
    pub block_updates: Mutex<Vec<(String, serde_json::Value)>>,
    pub contact_searches: Mutex<Vec<String>>,
}

#[async_trait]
impl BookingApi for FakeBookingApi {
    async fn availability(
        &self,
        _date: NaiveDate,
        _date_to: Option<NaiveDate>,
        _products: &[String],
        _centers: &[String],
    ) -> ApiResult<Vec<AvailabilityBlock>> {
        let delay = *self.availability_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.blocks.lock().unwrap().clone())
    }

    async fn productos(&self, _center_code: &str) -> ApiResult<Vec<ProductoRecord>> {
        self.productos_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.productos.lock().unwrap().clone())
    }

    async fn centros(&self) -> ApiResult<Vec<CentroRecord>> {
        Ok(self.centros.lock().unwrap().clone())
    }

    async fn search_contacts(&self, search: &str, _token: &str) -> ApiResult<serde_json::Value> {
        self.contact_searches
            .lock()
            .unwrap()
            .push(search.to_string());
        Ok(json!([{ "id": 7, "name": "Acme SL" }]))
    }

    async fn create_reservation(
        &self,
        payload: &serde_json::Value,
        _token: &str,
    ) -> ApiResult<serde_json::Value> {
        self.reservations.lock().unwrap().push(payload.clone());
        Ok(json!({ "id": 55 }))
    }

    async fn update_block(
        &self,
        block_id: &str,
        payload: &serde_json::Value,
        _token: &str,
    ) -> ApiResult<serde_json::Value> {
        self.block_updates
            .lock()
            .unwrap()
            .push((block_id.to_string(), payload.clone()));
        Ok(payload.clone())
    }

    async fn booking_usage(&self, _email: &str, _product: &str) -> ApiResult<UsageQuota> {
        self.quota
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Upstream("quota probe failed".to_string()))
    }

    async fn create_public_booking(
        &self,
        request: &PublicBookingRequest,
    ) -> ApiResult<BookingConfirmation> {
        if *self.fail_public_booking.lock().unwrap() {
            return Err(ApiError::Upstream("booking create failed".to_string()));
        }
        self.public_bookings.lock().unwrap().push(request.clone());
        Ok(BookingConfirmation {
            id: Some(json!(101)),
            reference: Some("BK-101".to_string()),
            status: Some("Created".to_string()),
        })
    }

    async fn current_user(&self, _token: &str) -> ApiResult<CurrentUser> {
        self.user
            .lock()
            .unwrap()
            .clone()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Scripted payments service. Secrets are deterministic (`pi_1_secret_test`,
/// `seti_1_secret_test`, ...) so tests can assert intent-id recovery.
#[derive(Default)]
pub struct FakePaymentsGateway {
    pub fail_subscription: Mutex<bool>,
    pub payment_intents: Mutex<Vec<PaymentIntentRequest>>,
    pub setup_intents: Mutex<Vec<SetupIntentRequest>>,
    pub subscriptions: Mutex<Vec<SubscriptionRequest>>,
}

#[async_trait]
impl PaymentsGateway for FakePaymentsGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> ApiResult<PaymentIntentResponse> {
        let mut intents = self.payment_intents.lock().unwrap();
        intents.push(request.clone());
        Ok(PaymentIntentResponse {
            client_secret: format!("pi_{}_secret_test", intents.len()),
        })
    }

    async fn create_setup_intent(
        &self,
        request: &SetupIntentRequest,
    ) -> ApiResult<SetupIntentResponse> {
        let mut intents = self.setup_intents.lock().unwrap();
        intents.push(request.clone());
        Ok(SetupIntentResponse {
            client_secret: format!("seti_{}_secret_test", intents.len()),
            id: format!("seti_{}", intents.len()),
        })
    }

    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> ApiResult<SubscriptionResponse> {
        if *self.fail_subscription.lock().unwrap() {
            return Err(ApiError::Upstream("subscription create failed".to_string()));
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.push(request.clone());
        Ok(SubscriptionResponse {
            id: format!("sub_{}", subscriptions.len()),
        })
    }
}
