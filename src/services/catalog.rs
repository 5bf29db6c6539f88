use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{CentroRecord, PriceUnit, ProductKind, ProductoRecord, Room};
use crate::services::booking_api::BookingApi;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Slug and display name of the aggregated desk fleet room.
const DESK_ROOM_SLUG: &str = "ma1-desks";
const DESK_ROOM_PRODUCT: &str = "MA1 Desks";

/// Injectable room store. Holds the catalog built from the booking API's
/// productos: one room per `MA1A*` aula plus a single aggregated desk room.
#[derive(Clone)]
pub struct CatalogService {
    rooms: Arc<RwLock<Vec<Room>>>,
    booking_api: Arc<dyn BookingApi>,
    center_code: String,
}

impl CatalogService {
    pub fn new(booking_api: Arc<dyn BookingApi>, center_code: String) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(Vec::new())),
            booking_api,
            center_code,
        }
    }

    pub async fn rooms(&self) -> Vec<Room> {
        self.rooms.read().await.clone()
    }

    pub async fn find(&self, key: &str) -> Option<Room> {
        self.rooms
            .read()
            .await
            .iter()
            .find(|room| room.matches_key(key))
            .cloned()
    }

    /// Replace the catalog wholesale.
    pub async fn set_rooms(&self, next: Vec<Room>) {
        *self.rooms.write().await = next;
    }

    /// Load the catalog if it is still empty (direct navigation before any
    /// refresh has run).
    pub async fn ensure_loaded(&self) -> ApiResult<()> {
        if !self.rooms.read().await.is_empty() {
            return Ok(());
        }
        self.refresh().await.map(|_| ())
    }

    /// Rebuild the catalog from the booking API. Returns the room count.
    pub async fn refresh(&self) -> ApiResult<usize> {
        let (productos, centros) = tokio::join!(
            self.booking_api.productos(&self.center_code),
            self.booking_api.centros(),
        );
        let productos = productos?;
        // Centro names only enrich the display; a failed lookup downgrades to
        // the default label.
        let centro_names = match centros {
            Ok(centros) => centro_labels(&centros),
            Err(err) => {
                warn!("Centros lookup failed, using default labels: {}", err);
                HashMap::new()
            }
        };

        let rooms = build_catalog(&productos, &centro_names);
        if rooms.is_empty() {
            return Err(ApiError::Upstream(
                "Booking API returned no bookable productos".to_string(),
            ));
        }

        let count = rooms.len();
        self.set_rooms(rooms).await;
        info!("Catalog refreshed: {} rooms", count);
        Ok(count)
    }
}

fn centro_labels(centros: &[CentroRecord]) -> HashMap<String, String> {
    centros
        .iter()
        .filter_map(|centro| {
            let code = centro.code.as_deref()?.trim().to_uppercase();
            let label = centro.label.as_deref()?.trim().to_string();
            if code.is_empty() || label.is_empty() {
                None
            } else {
                Some((code, label))
            }
        })
        .collect()
}

/// Aulas become individual rooms; every desk producto folds into one
/// aggregated room keyed `ma1-desks`.
pub fn build_catalog(
    productos: &[ProductoRecord],
    centro_names: &HashMap<String, String>,
) -> Vec<Room> {
    let centro_for = |producto: &ProductoRecord| -> Option<String> {
        centro_names.get(&producto.center_code_upper()).cloned()
    };

    let mut rooms: Vec<Room> = productos
        .iter()
        .filter(|producto| {
            let name = producto
                .trimmed_name()
                .unwrap_or_default()
                .to_uppercase();
            producto.tipo_lower() == "aula" && name.starts_with("MA1A")
        })
        .filter_map(|producto| Room::from_producto(producto, centro_for(producto).as_deref()))
        .collect();

    let desks: Vec<&ProductoRecord> = productos.iter().filter(|p| p.is_desk()).collect();
    let canonical = productos.iter().find(|p| p.is_canonical_desk());

    let desk_room = match canonical {
        Some(producto) => Room::from_producto(producto, centro_for(producto).as_deref()),
        None => desks.first().and_then(|sample| {
            let mut template = (*sample).clone();
            template.name = Some(DESK_ROOM_PRODUCT.to_string());
            template.capacity = Some(desks.len() as u32);
            Room::from_producto(&template, centro_for(sample).as_deref())
        }),
    };

    if let Some(mut desk_room) = desk_room {
        desk_room.id = DESK_ROOM_SLUG.to_string();
        desk_room.slug = DESK_ROOM_SLUG.to_string();
        desk_room.product_name = DESK_ROOM_PRODUCT.to_string();
        desk_room.price_unit = PriceUnit::PerMonth;
        desk_room.kind = ProductKind::Desk;
        rooms.push(desk_room);
    }

    rooms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producto(name: &str, tipo: &str) -> ProductoRecord {
        ProductoRecord {
            name: Some(name.to_string()),
            tipo: Some(tipo.to_string()),
            center_code: Some("MA1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_catalog_aggregates_desks_into_one_room() {
        let productos = vec![
            producto("MA1A1", "aula"),
            producto("MA1A2", "aula"),
            producto("MA1O1-1", "mesa"),
            producto("MA1O1-2", "mesa"),
            producto("MA1O1-3", "mesa"),
        ];
        let rooms = build_catalog(&productos, &HashMap::new());
        assert_eq!(rooms.len(), 3);

        let desk_room = rooms.iter().find(|r| r.slug == "ma1-desks").unwrap();
        assert_eq!(desk_room.product_name, "MA1 Desks");
        assert_eq!(desk_room.kind, ProductKind::Desk);
        assert_eq!(desk_room.price_unit, PriceUnit::PerMonth);
        assert_eq!(desk_room.capacity, Some(3));
    }

    #[test]
    fn test_canonical_desk_producto_wins_over_samples() {
        let mut canonical = producto("MA1 Desks", "mesa");
        canonical.capacity = Some(16);
        let productos = vec![producto("MA1O1-1", "mesa"), canonical];
        let rooms = build_catalog(&productos, &HashMap::new());
        let desk_room = rooms.iter().find(|r| r.slug == "ma1-desks").unwrap();
        assert_eq!(desk_room.capacity, Some(16));
    }

    #[test]
    fn test_non_ma1a_aulas_are_excluded() {
        let productos = vec![producto("MA2A1", "aula"), producto("Sala Norte", "aula")];
        assert!(build_catalog(&productos, &HashMap::new()).is_empty());
    }

    #[test]
    fn test_centro_labels_enrich_rooms() {
        let mut labels = HashMap::new();
        labels.insert("MA1".to_string(), "Málaga Alameda".to_string());
        let rooms = build_catalog(&[producto("MA1A1", "aula")], &labels);
        assert_eq!(rooms[0].centro, "Málaga Alameda");
    }
}
