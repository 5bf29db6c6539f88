use crate::models::{
    BookingType, LineAmounts, PriceQuote, ProductKind, Room, Schedule, DESK_DAY_PRICE,
    DESK_MONTH_PRICE,
};
use crate::services::slots::time_to_minutes;

/// Price the current schedule against a room. Returns `None` while the
/// schedule cannot be priced yet (no times, inverted times, no list price),
/// which also disables checkout.
pub fn quote_for(room: &Room, schedule: &Schedule) -> Option<PriceQuote> {
    match room.kind {
        ProductKind::Desk => desk_quote(schedule),
        ProductKind::MeetingRoom => hourly_quote(room, schedule),
    }
}

/// Desk rates are flat and ignore the room's advertised price.
fn desk_quote(schedule: &Schedule) -> Option<PriceQuote> {
    match schedule.booking_type? {
        BookingType::Day => Some(PriceQuote::DeskDay {
            amounts: LineAmounts::from_subtotal(DESK_DAY_PRICE),
        }),
        BookingType::Month => {
            let months = schedule.duration_months.unwrap_or(1).max(1);
            Some(PriceQuote::DeskMonth {
                months,
                monthly: LineAmounts::from_subtotal(DESK_MONTH_PRICE),
                term: LineAmounts::from_subtotal(DESK_MONTH_PRICE * months as f64),
            })
        }
    }
}

fn hourly_quote(room: &Room, schedule: &Schedule) -> Option<PriceQuote> {
    let price_from = room.price_from?;
    let start = time_to_minutes(schedule.start_time.as_deref()?)?;
    let end = time_to_minutes(schedule.end_time.as_deref()?)?;
    if end <= start {
        return None;
    }
    let hours = (end - start) as f64 / 60.0;
    Some(PriceQuote::Hourly {
        hours,
        amounts: LineAmounts::from_subtotal(hours * price_from),
    })
}
