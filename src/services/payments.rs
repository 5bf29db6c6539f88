use crate::api::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Payment-intent body. The processor expects lowercase currency codes and
/// amounts in minor units.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    pub tenant: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupIntentRequest {
    pub email: String,
    pub name: String,
    pub tenant: String,
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntentResponse {
    pub client_secret: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRequest {
    pub setup_intent_id: String,
    pub monthly_amount: i64,
    pub currency: String,
    pub duration_months: u32,
    /// Unix seconds at which the subscription stops renewing.
    pub cancel_at: i64,
    pub tenant: String,
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionResponse {
    pub id: String,
}

/// Payments service in front of Stripe: one-time intents for single
/// bookings, setup intents plus subscriptions for multi-month desk terms.
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> ApiResult<PaymentIntentResponse>;

    async fn create_setup_intent(
        &self,
        request: &SetupIntentRequest,
    ) -> ApiResult<SetupIntentResponse>;

    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> ApiResult<SubscriptionResponse>;
}

#[derive(Clone)]
pub struct HttpPaymentsGateway {
    client: Client,
    base_url: String,
}

impl HttpPaymentsGateway {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                format!("Payment service returned HTTP {}", status.as_u16())
            } else {
                text.chars().take(500).collect()
            };
            return Err(ApiError::Upstream(message));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentsGateway for HttpPaymentsGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> ApiResult<PaymentIntentResponse> {
        info!(
            "Creating payment intent for {} ({} {})",
            request.reference, request.amount, request.currency
        );
        self.post_json("/api/payment-intents", request).await
    }

    async fn create_setup_intent(
        &self,
        request: &SetupIntentRequest,
    ) -> ApiResult<SetupIntentResponse> {
        info!("Creating setup intent for {}", request.reference);
        self.post_json("/api/setup-intents", request).await
    }

    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> ApiResult<SubscriptionResponse> {
        info!(
            "Creating subscription for {} ({} months)",
            request.reference, request.duration_months
        );
        self.post_json("/api/subscriptions", request).await
    }
}
