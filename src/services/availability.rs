use crate::api::middleware::error::ApiResult;
use crate::models::{
    desk_number_from_product, AvailabilityBlock, DeskAvailability, GridSlot, OccupiedBy, Room,
    DESK_COUNT,
};
use crate::services::booking_api::BookingApi;
use crate::services::slots::{default_slots, SLOT_STEP_MINUTES};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CacheEntry {
    fetched_at: Instant,
    blocks: Arc<Vec<AvailabilityBlock>>,
}

/// Availability queries against the booking API, with the day grid and desk
/// period classification on top.
///
/// Queries are coalesced per `(date, dateTo, products)` key: concurrent
/// identical requests share one upstream call, and a short TTL serves repeat
/// lookups. Results are only ever stored under the key they were fetched
/// for, so a slow response cannot overwrite a newer query's entry.
#[derive(Clone)]
pub struct AvailabilityService {
    booking_api: Arc<dyn BookingApi>,
    center_code: String,
    cache_ttl: Duration,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AvailabilityService {
    pub fn new(booking_api: Arc<dyn BookingApi>, center_code: String, cache_ttl: Duration) -> Self {
        Self {
            booking_api,
            center_code,
            cache_ttl,
            cache: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Day grid for a room: every slot of the default window classified as
    /// available or occupied. Only blocks whose product name equals the
    /// room's product name (case-insensitive) count.
    pub async fn day_grid(&self, room: &Room, date: NaiveDate) -> ApiResult<Vec<GridSlot>> {
        let products = vec![room.product_name.clone()];
        let blocks = self.blocks_for(date, None, &products).await?;

        let midnight = date.and_time(NaiveTime::MIN);
        let grid = default_slots()
            .iter()
            .map(|slot| {
                let slot_start = midnight + ChronoDuration::minutes(slot.minutes as i64);
                let slot_end = slot_start + ChronoDuration::minutes(SLOT_STEP_MINUTES as i64);
                let hit = blocks.iter().find(|block| {
                    block
                        .product_name()
                        .map(|name| room.matches_product(name))
                        .unwrap_or(false)
                        && block.covers_slot(slot_start, slot_end)
                });
                match hit {
                    Some(block) => GridSlot::occupied(
                        slot,
                        OccupiedBy {
                            block_id: block.id.clone(),
                            estado: block.estado.clone(),
                            cliente: block.cliente_name().map(|s| s.to_string()),
                        },
                    ),
                    None => GridSlot::available(slot),
                }
            })
            .collect();
        Ok(grid)
    }

    /// Free desk numbers for a period. A desk is booked when any of its
    /// blocks overlaps `[date .. date_to]` inclusively.
    pub async fn free_desks(
        &self,
        date: NaiveDate,
        date_to: Option<NaiveDate>,
    ) -> ApiResult<DeskAvailability> {
        let end = date_to.unwrap_or(date);
        let blocks = self.blocks_for(date, Some(end), &[]).await?;

        let mut booked: BTreeSet<u32> = BTreeSet::new();
        for block in blocks.iter() {
            let Some(number) = block.product_name().and_then(desk_number_from_product) else {
                continue;
            };
            if block.overlaps_days(date, end) {
                booked.insert(number);
            }
        }

        let available = (1..=DESK_COUNT).filter(|n| !booked.contains(n)).collect();
        Ok(DeskAvailability {
            total: DESK_COUNT,
            available,
            booked: booked.into_iter().collect(),
        })
    }

    /// Fetch blocks through the dedup cache.
    async fn blocks_for(
        &self,
        date: NaiveDate,
        date_to: Option<NaiveDate>,
        products: &[String],
    ) -> ApiResult<Arc<Vec<AvailabilityBlock>>> {
        let key = cache_key(date, date_to, products);

        if let Some(blocks) = self.cached(&key).await {
            return Ok(blocks);
        }

        // One fetch per key at a time; everyone else waits and then reads the
        // fresh cache entry.
        let fetch_lock = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = fetch_lock.lock().await;

        if let Some(blocks) = self.cached(&key).await {
            return Ok(blocks);
        }

        let centers = vec![self.center_code.clone()];
        let blocks = Arc::new(
            self.booking_api
                .availability(date, date_to, products, &centers)
                .await?,
        );

        {
            let mut cache = self.cache.lock().await;
            cache.retain(|_, entry| entry.fetched_at.elapsed() < self.cache_ttl);
            cache.insert(
                key.clone(),
                CacheEntry {
                    fetched_at: Instant::now(),
                    blocks: blocks.clone(),
                },
            );
        }
        self.in_flight.lock().await.remove(&key);
        Ok(blocks)
    }

    async fn cached(&self, key: &str) -> Option<Arc<Vec<AvailabilityBlock>>> {
        let cache = self.cache.lock().await;
        cache
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.blocks.clone())
    }
}

fn cache_key(date: NaiveDate, date_to: Option<NaiveDate>, products: &[String]) -> String {
    let mut normalized: Vec<String> = products.iter().map(|p| p.to_lowercase()).collect();
    normalized.sort();
    format!(
        "{}|{}|{}",
        date,
        date_to.map(|d| d.to_string()).unwrap_or_default(),
        normalized.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalizes_product_order_and_case() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 18).unwrap();
        let a = cache_key(date, None, &["MA1A1".to_string(), "ma1a2".to_string()]);
        let b = cache_key(date, None, &["MA1A2".to_string(), "MA1A1".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_separates_ranges() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 18).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_ne!(cache_key(date, None, &[]), cache_key(date, Some(to), &[]));
    }
}
