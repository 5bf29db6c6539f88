use crate::models::schedule::BookingType;
use crate::models::visitor::{BillingDetails, VisitorContact};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-quota probe result for `(email, product)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuota {
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub used: u32,
    #[serde(default)]
    pub free_limit: u32,
}

/// Visitor booking submitted to `POST /public/bookings`, for both the free
/// path and the paid path (payment references filled in the latter).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBookingRequest {
    pub product: String,
    pub center: String,
    pub date: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub attendees: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<BookingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub contact: VisitorContact,
    pub billing: BillingDetails,
    /// Cents actually charged; zero for free-quota bookings.
    pub amount: i64,
    pub currency: String,
    pub free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl BookingConfirmation {
    /// Best available identifier for logs and the client response.
    pub fn reference_string(&self) -> Option<String> {
        if let Some(reference) = &self.reference {
            return Some(reference.clone());
        }
        self.id.as_ref().map(|id| match id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Profile row from the auth endpoint, used to prefill the contact step for
/// signed-in bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl CurrentUser {
    /// Map a profile to the contact form shape. Single `name` values split on
    /// the first space.
    pub fn to_prefill(&self) -> ContactPrefill {
        let (first, last) = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => (first.clone(), last.clone()),
            _ => {
                let full = self.name.clone().unwrap_or_default();
                match full.split_once(' ') {
                    Some((first, last)) => (first.to_string(), last.to_string()),
                    None => (full, String::new()),
                }
            }
        };
        ContactPrefill {
            first_name: first,
            last_name: last,
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            company: self.company.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPrefill {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}
