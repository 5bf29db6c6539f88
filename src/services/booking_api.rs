use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{
    AvailabilityBlock, BookingConfirmation, CentroRecord, CurrentUser, ProductoRecord,
    PublicBookingRequest, UsageQuota,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, info};

/// Remote booking API: availability blocks, catalog lookups, reservations
/// and the public visitor booking endpoints.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn availability(
        &self,
        date: NaiveDate,
        date_to: Option<NaiveDate>,
        products: &[String],
        centers: &[String],
    ) -> ApiResult<Vec<AvailabilityBlock>>;

    async fn productos(&self, center_code: &str) -> ApiResult<Vec<ProductoRecord>>;

    async fn centros(&self) -> ApiResult<Vec<CentroRecord>>;

    async fn search_contacts(&self, search: &str, token: &str) -> ApiResult<serde_json::Value>;

    async fn create_reservation(
        &self,
        payload: &serde_json::Value,
        token: &str,
    ) -> ApiResult<serde_json::Value>;

    async fn update_block(
        &self,
        block_id: &str,
        payload: &serde_json::Value,
        token: &str,
    ) -> ApiResult<serde_json::Value>;

    async fn booking_usage(&self, email: &str, product: &str) -> ApiResult<UsageQuota>;

    async fn create_public_booking(
        &self,
        request: &PublicBookingRequest,
    ) -> ApiResult<BookingConfirmation>;

    async fn current_user(&self, token: &str) -> ApiResult<CurrentUser>;
}

#[derive(Clone)]
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Upstream error contract: non-2xx responses surface their body text as the
/// message, falling back to the status code.
async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body.chars().take(500).collect()
    };
    Err(ApiError::Upstream(message))
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn availability(
        &self,
        date: NaiveDate,
        date_to: Option<NaiveDate>,
        products: &[String],
        centers: &[String],
    ) -> ApiResult<Vec<AvailabilityBlock>> {
        let mut query: Vec<(&str, String)> =
            vec![("date", date.format("%Y-%m-%d").to_string())];
        if let Some(date_to) = date_to {
            query.push(("dateTo", date_to.format("%Y-%m-%d").to_string()));
        }
        for product in products {
            query.push(("products", product.clone()));
        }
        for center in centers {
            query.push(("centers", center.clone()));
        }

        debug!("Fetching availability for {} ({} products)", date, products.len());
        let response = self
            .client
            .get(self.url("/public/availability"))
            .query(&query)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn productos(&self, center_code: &str) -> ApiResult<Vec<ProductoRecord>> {
        let response = self
            .client
            .get(self.url("/bookings/lookups/productos"))
            .query(&[("centerCode", center_code)])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn centros(&self) -> ApiResult<Vec<CentroRecord>> {
        let response = self
            .client
            .get(self.url("/bookings/lookups/centros"))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn search_contacts(&self, search: &str, token: &str) -> ApiResult<serde_json::Value> {
        let response = self
            .client
            .get(self.url("/bookings/lookups/contacts"))
            .query(&[("search", search)])
            .bearer_auth(token)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_reservation(
        &self,
        payload: &serde_json::Value,
        token: &str,
    ) -> ApiResult<serde_json::Value> {
        let response = self
            .client
            .post(self.url("/bookings"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        let created = ensure_success(response).await?.json().await?;
        info!("Reservation created through the internal dialog");
        Ok(created)
    }

    async fn update_block(
        &self,
        block_id: &str,
        payload: &serde_json::Value,
        token: &str,
    ) -> ApiResult<serde_json::Value> {
        let response = self
            .client
            .put(self.url(&format!("/bloqueos/{}", block_id)))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        let updated = ensure_success(response).await?.json().await?;
        info!("Block {} updated", block_id);
        Ok(updated)
    }

    async fn booking_usage(&self, email: &str, product: &str) -> ApiResult<UsageQuota> {
        let response = self
            .client
            .get(self.url("/public/bookings/usage"))
            .query(&[("email", email), ("product", product)])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create_public_booking(
        &self,
        request: &PublicBookingRequest,
    ) -> ApiResult<BookingConfirmation> {
        let response = self
            .client
            .post(self.url("/public/bookings"))
            .json(request)
            .send()
            .await?;
        let confirmation: BookingConfirmation = ensure_success(response).await?.json().await?;
        info!(
            "Public booking created for {} ({})",
            request.product,
            if request.free { "free quota" } else { "paid" }
        );
        Ok(confirmation)
    }

    async fn current_user(&self, token: &str) -> ApiResult<CurrentUser> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}
