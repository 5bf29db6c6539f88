use serde::Serialize;

/// Spanish VAT applied to every booking.
pub const VAT_RATE: f64 = 0.21;
/// Flat desk rates, independent of the room's advertised price.
pub const DESK_DAY_PRICE: f64 = 10.0;
pub const DESK_MONTH_PRICE: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAmounts {
    pub subtotal: f64,
    pub vat: f64,
    pub total: f64,
}

impl LineAmounts {
    pub fn from_subtotal(subtotal: f64) -> Self {
        let vat = subtotal * VAT_RATE;
        LineAmounts {
            subtotal,
            vat,
            total: subtotal + vat,
        }
    }

    /// Minor units for the payments API.
    pub fn total_cents(&self) -> i64 {
        (self.total * 100.0).round() as i64
    }
}

/// A priced schedule. `DeskMonth` carries both the per-month amounts (what a
/// subscription charges) and the whole-term amounts shown as the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PriceQuote {
    Hourly {
        hours: f64,
        amounts: LineAmounts,
    },
    DeskDay {
        amounts: LineAmounts,
    },
    DeskMonth {
        months: u32,
        monthly: LineAmounts,
        term: LineAmounts,
    },
}

impl PriceQuote {
    /// Amounts of the first charge: the full total for one-time bookings,
    /// one month's gross for subscriptions.
    pub fn charge(&self) -> &LineAmounts {
        match self {
            PriceQuote::Hourly { amounts, .. } => amounts,
            PriceQuote::DeskDay { amounts } => amounts,
            PriceQuote::DeskMonth { monthly, .. } => monthly,
        }
    }

    pub fn charge_cents(&self) -> i64 {
        self.charge().total_cents()
    }

    pub fn months(&self) -> Option<u32> {
        match self {
            PriceQuote::DeskMonth { months, .. } => Some(*months),
            _ => None,
        }
    }
}

/// Two-decimal euro rendering used on every money field the API returns.
pub fn format_eur(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountsView {
    pub subtotal: String,
    pub vat: String,
    pub total: String,
}

impl From<&LineAmounts> for AmountsView {
    fn from(amounts: &LineAmounts) -> Self {
        AmountsView {
            subtotal: format_eur(amounts.subtotal),
            vat: format_eur(amounts.vat),
            total: format_eur(amounts.total),
        }
    }
}

/// Quote as returned to the client, with formatted amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub kind: String,
    pub currency: String,
    #[serde(flatten)]
    pub amounts: AmountsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly: Option<AmountsView>,
    pub waived: bool,
}

impl QuoteResponse {
    pub fn new(quote: &PriceQuote, waived: bool) -> Self {
        match quote {
            PriceQuote::Hourly { hours, amounts } => QuoteResponse {
                kind: "hourly".to_string(),
                currency: "EUR".to_string(),
                amounts: amounts.into(),
                hours: Some(*hours),
                months: None,
                monthly: None,
                waived,
            },
            PriceQuote::DeskDay { amounts } => QuoteResponse {
                kind: "deskDay".to_string(),
                currency: "EUR".to_string(),
                amounts: amounts.into(),
                hours: None,
                months: None,
                monthly: None,
                waived,
            },
            PriceQuote::DeskMonth {
                months,
                monthly,
                term,
            } => QuoteResponse {
                kind: "deskMonth".to_string(),
                currency: "EUR".to_string(),
                amounts: term.into(),
                hours: None,
                months: Some(*months),
                monthly: Some(monthly.into()),
                waived,
            },
        }
    }
}
