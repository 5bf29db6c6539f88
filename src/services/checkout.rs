use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{
    CheckoutState, FlowSession, FlowStep, PriceQuote, ProductKind, PublicBookingRequest,
    QuoteResponse, Room,
};
use crate::services::booking_api::BookingApi;
use crate::services::flow::ensure_step;
use crate::services::payments::{
    PaymentIntentRequest, PaymentsGateway, SetupIntentRequest, SubscriptionRequest,
};
use crate::services::pricing;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const PAYMENTS_DISABLED_MESSAGE: &str =
    "Online payment is not configured. Please contact the space to finish this booking.";

/// What `begin` resolved for the draft: the free-quota path finishes
/// immediately, the paid paths hand a client secret back for confirmation,
/// and a missing payments config degrades instead of failing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BeginResponse {
    #[serde(rename_all = "camelCase")]
    Free {
        #[serde(skip_serializing_if = "Option::is_none")]
        booking_ref: Option<String>,
        quote: QuoteResponse,
    },
    #[serde(rename_all = "camelCase")]
    PaymentsDisabled { message: String },
    #[serde(rename_all = "camelCase")]
    PaymentIntent {
        client_secret: String,
        amount: i64,
        quote: QuoteResponse,
    },
    #[serde(rename_all = "camelCase")]
    SetupIntent {
        client_secret: String,
        quote: QuoteResponse,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    /// Intent id reported by the client after confirmation. Optional for the
    /// one-time path since the id can be recovered from the client secret.
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub confirmed: bool,
    pub free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

/// Checkout orchestration: quota check, intent creation and the final
/// booking/subscription calls, strictly in that order.
///
/// Callers hold the flow session lock across `begin` and `complete`, so no
/// two payment-affecting calls for the same draft ever run concurrently.
#[derive(Clone)]
pub struct CheckoutService {
    booking_api: Arc<dyn BookingApi>,
    payments: Option<Arc<dyn PaymentsGateway>>,
    tenant: String,
    center_code: String,
}

impl CheckoutService {
    pub fn new(
        booking_api: Arc<dyn BookingApi>,
        payments: Option<Arc<dyn PaymentsGateway>>,
        tenant: String,
        center_code: String,
    ) -> Self {
        Self {
            booking_api,
            payments,
            tenant,
            center_code,
        }
    }

    /// Resolve the payment path for the draft. Free quota wins over both paid
    /// shapes; a repeated call reuses an already-created intent so a failed
    /// confirmation can retry without re-entering anything.
    pub async fn begin(&self, session: &mut FlowSession, room: &Room) -> ApiResult<BeginResponse> {
        ensure_step(session, FlowStep::Payment)?;
        if matches!(session.checkout, CheckoutState::Finished { .. }) {
            return Err(ApiError::Conflict(
                "This booking flow is already completed".to_string(),
            ));
        }

        let contact = session.contact.clone().ok_or_else(|| {
            ApiError::Conflict("Contact details have not been submitted".to_string())
        })?;
        let quote = pricing::quote_for(room, &session.schedule).ok_or_else(|| {
            ApiError::BadRequest("The schedule cannot be priced yet".to_string())
        })?;

        // Step 1: free-quota eligibility. A failed probe is not fatal; the
        // visitor just pays as usual.
        match self
            .booking_api
            .booking_usage(&contact.email, &room.product_name)
            .await
        {
            Ok(quota) if quota.is_free => {
                info!(
                    "Free booking quota available for {} on {} ({}/{} used)",
                    contact.email, room.product_name, quota.used, quota.free_limit
                );
                let booking = self.build_booking(session, room, &quote, true, None, None)?;
                let confirmation = self.booking_api.create_public_booking(&booking).await?;
                let booking_ref = confirmation.reference_string();
                session.checkout = CheckoutState::Finished {
                    free: true,
                    booking_ref: booking_ref.clone(),
                    subscription_id: None,
                };
                return Ok(BeginResponse::Free {
                    booking_ref,
                    quote: QuoteResponse::new(&quote, true),
                });
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    "Usage quota check failed, continuing with the paid path: {}",
                    err
                );
            }
        }

        let Some(payments) = &self.payments else {
            return Ok(BeginResponse::PaymentsDisabled {
                message: PAYMENTS_DISABLED_MESSAGE.to_string(),
            });
        };

        // Step 2: multi-month desk terms capture a reusable payment method,
        // everything else is a single charge.
        if room.kind == ProductKind::Desk && session.schedule.is_subscription() {
            if let CheckoutState::SetupIntent { client_secret, .. } = &session.checkout {
                return Ok(BeginResponse::SetupIntent {
                    client_secret: client_secret.clone(),
                    quote: QuoteResponse::new(&quote, false),
                });
            }
            let intent = payments
                .create_setup_intent(&SetupIntentRequest {
                    email: contact.email.clone(),
                    name: contact.full_name(),
                    tenant: self.tenant.clone(),
                    reference: room.id.clone(),
                })
                .await?;
            session.checkout = CheckoutState::SetupIntent {
                client_secret: intent.client_secret.clone(),
                setup_intent_id: intent.id,
            };
            return Ok(BeginResponse::SetupIntent {
                client_secret: intent.client_secret,
                quote: QuoteResponse::new(&quote, false),
            });
        }

        if let CheckoutState::PaymentIntent { client_secret } = &session.checkout {
            return Ok(BeginResponse::PaymentIntent {
                client_secret: client_secret.clone(),
                amount: quote.charge_cents(),
                quote: QuoteResponse::new(&quote, false),
            });
        }
        let intent = payments
            .create_payment_intent(&PaymentIntentRequest {
                amount: quote.charge_cents(),
                currency: "eur".to_string(),
                reference: room.id.clone(),
                tenant: self.tenant.clone(),
            })
            .await?;
        session.checkout = CheckoutState::PaymentIntent {
            client_secret: intent.client_secret.clone(),
        };
        Ok(BeginResponse::PaymentIntent {
            client_secret: intent.client_secret,
            amount: quote.charge_cents(),
            quote: QuoteResponse::new(&quote, false),
        })
    }

    /// Finalize after the client confirmed the intent: create the
    /// subscription where one is due, then the booking record.
    pub async fn complete(
        &self,
        session: &mut FlowSession,
        room: &Room,
        request: CompleteRequest,
    ) -> ApiResult<CompleteResponse> {
        ensure_step(session, FlowStep::Payment)?;
        let quote = pricing::quote_for(room, &session.schedule).ok_or_else(|| {
            ApiError::BadRequest("The schedule cannot be priced yet".to_string())
        })?;

        match session.checkout.clone() {
            CheckoutState::Finished { .. } => Err(ApiError::Conflict(
                "This booking flow is already completed".to_string(),
            )),
            CheckoutState::Idle => {
                if self.payments.is_none() {
                    Err(ApiError::Unavailable(PAYMENTS_DISABLED_MESSAGE.to_string()))
                } else {
                    Err(ApiError::Conflict(
                        "Checkout has not begun for this flow".to_string(),
                    ))
                }
            }
            CheckoutState::SetupIntent {
                setup_intent_id, ..
            } => {
                let PriceQuote::DeskMonth {
                    months, monthly, ..
                } = &quote
                else {
                    return Err(ApiError::Conflict(
                        "The schedule no longer matches a subscription checkout".to_string(),
                    ));
                };
                let payments = self
                    .payments
                    .as_ref()
                    .ok_or_else(|| ApiError::Unavailable(PAYMENTS_DISABLED_MESSAGE.to_string()))?;

                // Subscription creation failure keeps the setup intent so the
                // client can retry with the saved payment method.
                let subscription = payments
                    .create_subscription(&SubscriptionRequest {
                        setup_intent_id: setup_intent_id.clone(),
                        monthly_amount: monthly.total_cents(),
                        currency: "eur".to_string(),
                        duration_months: *months,
                        cancel_at: cancel_at_end_of(session.schedule.end_date()),
                        tenant: self.tenant.clone(),
                        reference: room.id.clone(),
                    })
                    .await
                    .map_err(|err| {
                        warn!(
                            "Subscription creation failed for setup intent {}: {}",
                            setup_intent_id, err
                        );
                        err
                    })?;

                let booking = self.build_booking(
                    session,
                    room,
                    &quote,
                    false,
                    None,
                    Some(subscription.id.clone()),
                )?;
                let booking_ref = self.booking_after_charge(&booking, &subscription.id).await;
                session.checkout = CheckoutState::Finished {
                    free: false,
                    booking_ref: booking_ref.clone(),
                    subscription_id: Some(subscription.id.clone()),
                };
                Ok(CompleteResponse {
                    confirmed: true,
                    free: false,
                    booking_ref,
                    subscription_id: Some(subscription.id),
                })
            }
            CheckoutState::PaymentIntent { client_secret } => {
                let intent_id = request
                    .payment_intent_id
                    .or_else(|| intent_id_from_secret(&client_secret))
                    .ok_or_else(|| {
                        ApiError::BadRequest(
                            "A payment intent id is required to complete checkout".to_string(),
                        )
                    })?;
                let booking =
                    self.build_booking(session, room, &quote, false, Some(intent_id.clone()), None)?;
                let booking_ref = self.booking_after_charge(&booking, &intent_id).await;
                session.checkout = CheckoutState::Finished {
                    free: false,
                    booking_ref: booking_ref.clone(),
                    subscription_id: None,
                };
                Ok(CompleteResponse {
                    confirmed: true,
                    free: false,
                    booking_ref,
                    subscription_id: None,
                })
            }
        }
    }

    /// Booking creation after money has moved. Failure is logged with the
    /// payment reference and reported as success to the caller; the charge
    /// stands and support reconciles the reservation manually.
    async fn booking_after_charge(
        &self,
        booking: &PublicBookingRequest,
        payment_ref: &str,
    ) -> Option<String> {
        match self.booking_api.create_public_booking(booking).await {
            Ok(confirmation) => confirmation.reference_string(),
            Err(err) => {
                error!(
                    "Booking creation failed after a successful charge (payment reference {}): {}",
                    payment_ref, err
                );
                None
            }
        }
    }

    fn build_booking(
        &self,
        session: &FlowSession,
        room: &Room,
        quote: &PriceQuote,
        free: bool,
        payment_intent_id: Option<String>,
        subscription_id: Option<String>,
    ) -> ApiResult<PublicBookingRequest> {
        let contact = session.contact.clone().ok_or_else(|| {
            ApiError::Conflict("Contact details have not been submitted".to_string())
        })?;
        let billing = session.billing.clone().unwrap_or_default();
        let schedule = &session.schedule;
        // Desk bookings reserve one specific desk, not the aggregate product.
        let product = schedule
            .desk_product_name
            .clone()
            .unwrap_or_else(|| room.product_name.clone());

        Ok(PublicBookingRequest {
            product,
            center: self.center_code.clone(),
            date: schedule.date,
            date_to: schedule.end_date(),
            start_time: schedule.start_time.clone(),
            end_time: schedule.end_time.clone(),
            attendees: schedule.attendees,
            booking_type: schedule.booking_type,
            duration_months: schedule.duration_months,
            note: schedule.note.clone(),
            contact,
            billing,
            amount: if free { 0 } else { quote.charge_cents() },
            currency: "EUR".to_string(),
            free,
            payment_intent_id,
            subscription_id,
        })
    }
}

/// Unix seconds at the end of the booked period's last day; subscriptions
/// stop renewing there.
fn cancel_at_end_of(date: NaiveDate) -> i64 {
    date.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp()
}

/// Stripe-style client secrets embed the intent id: `pi_123_secret_456`.
fn intent_id_from_secret(secret: &str) -> Option<String> {
    let (id, _) = secret.split_once("_secret")?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_id_recovered_from_client_secret() {
        assert_eq!(
            intent_id_from_secret("pi_3OaXb2_secret_k9YtR"),
            Some("pi_3OaXb2".to_string())
        );
        assert_eq!(intent_id_from_secret("_secret_k9YtR"), None);
        assert_eq!(intent_id_from_secret("no-marker"), None);
    }

    #[test]
    fn test_cancel_at_is_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        let expected = date.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        assert_eq!(cancel_at_end_of(date), expected);
        // One second before the next midnight.
        assert_eq!((cancel_at_end_of(date) + 1) % 86_400, 0);
    }
}
