use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A reservation or block as `/public/availability` returns it. Datetimes are
/// naive local times (`2024-06-18T09:00:00`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBlock {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub fecha_ini: NaiveDateTime,
    pub fecha_fin: NaiveDateTime,
    #[serde(default)]
    pub producto: Option<BlockProducto>,
    #[serde(default)]
    pub cliente: Option<BlockCliente>,
    #[serde(default)]
    pub estado: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockProducto {
    #[serde(default, alias = "name")]
    pub nombre: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockCliente {
    #[serde(default, alias = "name")]
    pub nombre: Option<String>,
}

impl AvailabilityBlock {
    pub fn product_name(&self) -> Option<&str> {
        self.producto.as_ref().and_then(|p| p.nombre.as_deref())
    }

    pub fn cliente_name(&self) -> Option<&str> {
        self.cliente.as_ref().and_then(|c| c.nombre.as_deref())
    }

    /// Half-open interval intersection used for slot occupancy: the block
    /// occupies `[slot_start, slot_end)` iff the two intervals overlap with
    /// both ends exclusive.
    pub fn covers_slot(&self, slot_start: NaiveDateTime, slot_end: NaiveDateTime) -> bool {
        self.fecha_ini < slot_end && self.fecha_fin > slot_start
    }

    /// Inclusive day-range overlap used for desk periods: the range runs from
    /// `from` at midnight through `to` at 23:59:59.
    pub fn overlaps_days(&self, from: NaiveDate, to: NaiveDate) -> bool {
        let range_start = from.and_time(chrono::NaiveTime::MIN);
        let range_end = to.and_hms_opt(23, 59, 59).unwrap();
        self.fecha_ini <= range_end && self.fecha_fin >= range_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(from: &str, to: &str) -> AvailabilityBlock {
        AvailabilityBlock {
            id: None,
            fecha_ini: from.parse().unwrap(),
            fecha_fin: to.parse().unwrap(),
            producto: None,
            cliente: None,
            estado: None,
        }
    }

    #[test]
    fn test_slot_occupancy_is_half_open() {
        let b = block("2024-06-18T09:00:00", "2024-06-18T11:00:00");
        let date = NaiveDate::from_ymd_opt(2024, 6, 18).unwrap();
        let at = |h, m| date.and_hms_opt(h, m, 0).unwrap();

        // Slot ending exactly at the block start stays free.
        assert!(!b.covers_slot(at(8, 30), at(9, 0)));
        assert!(b.covers_slot(at(9, 0), at(9, 30)));
        assert!(b.covers_slot(at(10, 30), at(11, 0)));
        // Slot starting exactly at the block end stays free.
        assert!(!b.covers_slot(at(11, 0), at(11, 30)));
    }

    #[test]
    fn test_day_range_overlap_is_inclusive() {
        let b = block("2024-07-01T00:00:00", "2024-07-31T23:59:59");
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();

        assert!(b.overlaps_days(d(2024, 7, 31), d(2024, 8, 15)));
        assert!(b.overlaps_days(d(2024, 6, 15), d(2024, 7, 1)));
        assert!(!b.overlaps_days(d(2024, 8, 1), d(2024, 8, 31)));
    }

    #[test]
    fn test_block_parses_wire_format() {
        let json = r#"{
            "id": 42,
            "fechaIni": "2024-06-18T09:00:00",
            "fechaFin": "2024-06-18T11:00:00",
            "producto": { "nombre": "MA1A1" },
            "cliente": { "nombre": "Acme SL" },
            "estado": "Created"
        }"#;
        let b: AvailabilityBlock = serde_json::from_str(json).unwrap();
        assert_eq!(b.product_name(), Some("MA1A1"));
        assert_eq!(b.cliente_name(), Some("Acme SL"));
        assert_eq!(b.estado.as_deref(), Some("Created"));
    }
}
