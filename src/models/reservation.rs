use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Reservation categories the internal dialog offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationType {
    #[serde(rename = "Por Horas")]
    PorHoras,
    #[serde(rename = "Diaria")]
    Diaria,
    #[serde(rename = "Mensual")]
    Mensual,
}

impl ReservationType {
    pub fn is_per_hour(&self) -> bool {
        matches!(self, ReservationType::PorHoras)
    }

    /// Weekday restrictions only apply to hourly and daily reservations.
    pub fn shows_weekdays(&self) -> bool {
        matches!(self, ReservationType::PorHoras | ReservationType::Diaria)
    }
}

impl fmt::Display for ReservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationType::PorHoras => write!(f, "Por Horas"),
            ReservationType::Diaria => write!(f, "Diaria"),
            ReservationType::Mensual => write!(f, "Mensual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Created,
    Invoiced,
    Paid,
}

/// Internal reservation create/update form. Ids pass through as the booking
/// API issued them (numbers or strings).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub contact_id: Option<serde_json::Value>,
    pub centro_id: Option<serde_json::Value>,
    pub producto_id: Option<serde_json::Value>,
    pub reservation_type: ReservationType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub weekdays: Vec<String>,
    #[serde(default)]
    pub open_ended: bool,
    #[serde(default)]
    pub tarifa: Option<f64>,
    #[serde(default)]
    pub attendees: Option<u32>,
    #[serde(default)]
    pub configuracion: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub status: ReservationStatus,
}

impl ReservationDraft {
    /// Same checks the dialog runs before submitting.
    pub fn validate(&self) -> Result<(), String> {
        if self.contact_id.is_none() {
            return Err("Please select a contact".to_string());
        }
        if self.centro_id.is_none() {
            return Err("Please select a centro".to_string());
        }
        if self.producto_id.is_none() {
            return Err("Please select a producto".to_string());
        }
        if self.date_from > self.date_to {
            return Err("Start date must be before end date".to_string());
        }
        if self.reservation_type.is_per_hour()
            && (self.start_time.is_none() || self.end_time.is_none())
        {
            return Err("Start and end times are required".to_string());
        }
        Ok(())
    }

    /// Booking API payload: time slots only for hourly reservations, weekday
    /// restrictions only where they apply.
    pub fn to_payload(&self) -> serde_json::Value {
        let time_slots = if self.reservation_type.is_per_hour() {
            json!([{ "from": self.start_time, "to": self.end_time }])
        } else {
            json!([])
        };
        let weekdays: Vec<String> = if self.reservation_type.shows_weekdays() {
            self.weekdays.clone()
        } else {
            Vec::new()
        };

        json!({
            "contactId": self.contact_id,
            "centroId": self.centro_id,
            "productoId": self.producto_id,
            "reservationType": self.reservation_type,
            "dateFrom": self.date_from,
            "dateTo": self.date_to,
            "timeSlots": time_slots,
            "weekdays": weekdays,
            "openEnded": self.open_ended,
            "tarifa": self.tarifa,
            "attendees": self.attendees,
            "configuracion": self.configuracion,
            "note": self.note,
            "status": self.status,
        })
    }
}
