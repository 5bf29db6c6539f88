use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bookable desks in the MA1 open space.
pub const DESK_COUNT: u32 = 16;

const DEFAULT_CANCELLATION_POLICY: [&str; 3] = [
    "Cambios admitidos hasta 24 h antes del inicio.",
    "Modificaciones vía correo electrónico.",
    "No hay reembolso en caso de no asistencia.",
];

const DEFAULT_BOOKING_INSTRUCTIONS: [&str; 3] = [
    "Solicita tu horario y espera confirmación.",
    "Recibirás la factura y enlace de pago.",
    "Tras el pago te enviaremos instrucciones y acceso.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    MeetingRoom,
    Desk,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::MeetingRoom => write!(f, "meeting_room"),
            ProductKind::Desk => write!(f, "desk"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceUnit {
    #[serde(rename = "/h")]
    PerHour,
    #[serde(rename = "/day")]
    PerDay,
    #[serde(rename = "/month")]
    PerMonth,
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceUnit::PerHour => write!(f, "/h"),
            PriceUnit::PerDay => write!(f, "/day"),
            PriceUnit::PerMonth => write!(f, "/month"),
        }
    }
}

impl From<&str> for PriceUnit {
    fn from(value: &str) -> Self {
        match value.trim() {
            "/month" => PriceUnit::PerMonth,
            "/day" => PriceUnit::PerDay,
            _ => PriceUnit::PerHour,
        }
    }
}

/// A bookable space as the catalog exposes it: either one meeting room or the
/// aggregated desk fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub centro: String,
    pub kind: ProductKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_from: Option<f64>,
    pub price_unit: PriceUnit,
    pub currency: String,
    pub product_name: String,
    pub hero_image: String,
    pub gallery: Vec<String>,
    pub description: String,
    pub subtitle: String,
    pub amenities: Vec<String>,
    pub tags: Vec<String>,
    pub cancellation_policy: Vec<String>,
    pub booking_instructions: Vec<String>,
    pub instant_booking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_average: Option<f64>,
    pub rating_count: u32,
}

impl Room {
    /// Build a room from an API producto record. Returns `None` when the
    /// record has no usable name.
    pub fn from_producto(producto: &ProductoRecord, centro_name: Option<&str>) -> Option<Room> {
        let name = producto.trimmed_name()?;
        let name_upper = name.to_uppercase();

        let slug = if name_upper.starts_with("MA1") && !name_upper.contains("DESK") {
            name.to_lowercase()
        } else {
            name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
        };

        let kind = if producto.is_desk() {
            ProductKind::Desk
        } else {
            ProductKind::MeetingRoom
        };

        let price_unit = match producto.price_unit.as_deref() {
            Some(unit) if !unit.trim().is_empty() => PriceUnit::from(unit),
            _ => {
                if producto.tipo_lower() == "mesa" {
                    PriceUnit::PerMonth
                } else {
                    PriceUnit::PerHour
                }
            }
        };

        let display_name = producto
            .display_name
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| name.clone());

        Some(Room {
            id: slug.clone(),
            slug,
            name: display_name,
            centro: centro_name.unwrap_or("Málaga Workspace").to_string(),
            kind,
            capacity: producto.capacity,
            price_from: producto.price_from,
            price_unit,
            currency: "EUR".to_string(),
            product_name: name,
            hero_image: producto.hero_image.clone().unwrap_or_default(),
            gallery: producto.images.clone().unwrap_or_default(),
            description: producto.description.clone().unwrap_or_default(),
            subtitle: producto.subtitle.clone().unwrap_or_default(),
            amenities: producto.amenities.clone().unwrap_or_default(),
            tags: producto.tags.clone().unwrap_or_default(),
            cancellation_policy: DEFAULT_CANCELLATION_POLICY
                .iter()
                .map(|s| s.to_string())
                .collect(),
            booking_instructions: DEFAULT_BOOKING_INSTRUCTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            instant_booking: producto.instant_booking.unwrap_or(true),
            rating_average: producto.rating_average,
            rating_count: producto.rating_count.unwrap_or(0),
        })
    }

    pub fn matches_key(&self, key: &str) -> bool {
        self.slug.eq_ignore_ascii_case(key) || self.id.eq_ignore_ascii_case(key)
    }

    /// Product-name equality used everywhere blocks are matched to rooms.
    pub fn matches_product(&self, product_name: &str) -> bool {
        self.product_name.eq_ignore_ascii_case(product_name.trim())
    }
}

/// Producto record as the booking API returns it. Legacy responses use the
/// Spanish field names, so the English ones carry aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductoRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, rename = "type", alias = "tipo")]
    pub tipo: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, alias = "centroCodigo")]
    pub center_code: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub price_from: Option<f64>,
    #[serde(default)]
    pub price_unit: Option<String>,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub instant_booking: Option<bool>,
    #[serde(default)]
    pub rating_average: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u32>,
}

impl ProductoRecord {
    pub fn trimmed_name(&self) -> Option<String> {
        let name = self.name.as_deref()?.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    pub fn tipo_lower(&self) -> String {
        self.tipo.as_deref().unwrap_or_default().trim().to_lowercase()
    }

    pub fn center_code_upper(&self) -> String {
        self.center_code
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_uppercase()
    }

    /// Canonical desk fleet record: `MA1 Desk` / `MA1 Desks` in any casing or
    /// separator style.
    pub fn is_canonical_desk(&self) -> bool {
        let normalized = normalize_product_name(self.name.as_deref().unwrap_or_default());
        normalized == "MA1DESK" || normalized == "MA1DESKS"
    }

    pub fn is_desk(&self) -> bool {
        if self.tipo_lower() == "mesa" {
            return true;
        }
        if self.is_canonical_desk() {
            return true;
        }
        // Fallback for misclassified desk products.
        let normalized = normalize_product_name(self.name.as_deref().unwrap_or_default());
        Regex::new(r"^MA1O1\d{1,2}$").unwrap().is_match(&normalized)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentroRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default, alias = "codigo")]
    pub code: Option<String>,
    #[serde(default, alias = "nombre")]
    pub label: Option<String>,
    #[serde(default, alias = "ciudad")]
    pub city: Option<String>,
}

fn normalize_product_name(name: &str) -> String {
    name.trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect()
}

/// Product name for desk `number`, as stored in bookings.
pub fn desk_product_name(number: u32) -> String {
    format!("MA1O1-{}", number)
}

/// Parse the desk number out of a desk product name. Accepts the separator
/// variants seen in legacy data (`MA1O1-3`, `MA1O1_3`, `MA1O1 3`, `MA1O13`).
pub fn desk_number_from_product(name: &str) -> Option<u32> {
    let re = Regex::new(r"^MA1O1[-_ ]?(\d{1,2})$").unwrap();
    let upper = name.trim().to_uppercase();
    let captures = re.captures(&upper)?;
    captures.get(1)?.as_str().parse().ok()
}
