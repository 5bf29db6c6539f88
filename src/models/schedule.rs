use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription durations offered for desk month bookings.
pub const DURATION_OPTIONS: [u32; 4] = [1, 3, 6, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Day,
    Month,
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingType::Day => write!(f, "day"),
            BookingType::Month => write!(f, "month"),
        }
    }
}

/// What the visitor is asking to book. Hourly bookings fill the time fields,
/// desk bookings fill the desk fields; the flow keeps one schedule per
/// session and the details step mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// `HH:MM`; kept as text because the grid's final boundary is `24:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub attendees: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desk_product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_type: Option<BookingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Schedule {
    pub fn default_for(today: NaiveDate) -> Self {
        Schedule {
            date: today,
            date_to: None,
            start_time: None,
            end_time: None,
            attendees: 1,
            desk_product_name: None,
            booking_type: None,
            duration_months: None,
            note: None,
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        self.date_to.unwrap_or(self.date)
    }

    pub fn is_subscription(&self) -> bool {
        self.booking_type == Some(BookingType::Month) && self.duration_months.unwrap_or(0) > 1
    }
}

/// Date range covered by a month booking: first day of the start month
/// through `months` months minus one day.
pub fn month_range(start: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let first = start.with_day(1).unwrap_or(start);
    let end = first
        .checked_add_months(Months::new(months))
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, end)
}

/// Partial schedule mutation from the details step. Desk picks arrive as a
/// desk number and are expanded to the product name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub date: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub attendees: Option<u32>,
    pub desk_number: Option<u32>,
    pub booking_type: Option<BookingType>,
    pub duration_months: Option<u32>,
    pub note: Option<String>,
}
