use crate::models::TimeSlot;

/// Default bookable window: 06:00 through 24:00 in 30-minute steps.
pub const DAY_START_HOUR: u32 = 6;
pub const DAY_END_HOUR: u32 = 24;
pub const SLOT_STEP_MINUTES: u32 = 30;
/// Span proposed when a start slot is picked without an explicit end.
pub const DEFAULT_SLOT_SPAN_MINUTES: u32 = 60;

/// Parse `HH:MM` into minutes since midnight. The end-of-day boundary
/// `24:00` is accepted; anything past it is not.
pub fn time_to_minutes(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if minutes > 59 {
        return None;
    }
    let total = hours * 60 + minutes;
    if total > DAY_END_HOUR * 60 {
        return None;
    }
    Some(total)
}

/// Render minutes since midnight as `HH:MM`. The day's end renders as
/// `24:00`, not `00:00`.
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Slot boundaries from `start_hour` to `end_hour` inclusive of the final
/// boundary, so a 06:00–24:00 day at 30 minutes yields 37 slots.
pub fn slot_sequence(start_hour: u32, end_hour: u32, step_minutes: u32) -> Vec<TimeSlot> {
    if step_minutes == 0 || end_hour <= start_hour {
        return Vec::new();
    }
    let mut slots = Vec::new();
    let mut minutes = start_hour * 60;
    let end = end_hour * 60;
    while minutes <= end {
        let id = minutes_to_time(minutes);
        slots.push(TimeSlot {
            id: id.clone(),
            label: id,
            minutes,
        });
        minutes += step_minutes;
    }
    slots
}

pub fn default_slots() -> Vec<TimeSlot> {
    slot_sequence(DAY_START_HOUR, DAY_END_HOUR, SLOT_STEP_MINUTES)
}

/// End time proposed when `start_minutes` is selected, clamped to the end of
/// the bookable day.
pub fn proposed_end(start_minutes: u32) -> u32 {
    (start_minutes + DEFAULT_SLOT_SPAN_MINUTES).min(DAY_END_HOUR * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_round_trip() {
        for value in ["06:00", "09:30", "13:05", "23:30", "24:00"] {
            let minutes = time_to_minutes(value).unwrap();
            assert_eq!(minutes_to_time(minutes), value);
        }
    }

    #[test]
    fn test_time_parsing_rejects_garbage() {
        assert!(time_to_minutes("9").is_none());
        assert!(time_to_minutes("09:60").is_none());
        assert!(time_to_minutes("25:00").is_none());
        assert!(time_to_minutes("24:30").is_none());
        assert!(time_to_minutes("ab:cd").is_none());
    }

    #[test]
    fn test_default_grid_has_37_slots() {
        let slots = default_slots();
        assert_eq!(slots.len(), 37);
        assert_eq!(slots.first().unwrap().id, "06:00");
        assert_eq!(slots.last().unwrap().id, "24:00");
    }

    #[test]
    fn test_slot_count_formula() {
        // ((end - start) * 60) / step + 1
        let slots = slot_sequence(9, 18, 15);
        assert_eq!(slots.len(), ((18 - 9) * 60 / 15 + 1) as usize);
    }

    #[test]
    fn test_end_of_day_renders_as_24() {
        assert_eq!(minutes_to_time(24 * 60), "24:00");
    }

    #[test]
    fn test_degenerate_sequences_are_empty() {
        assert!(slot_sequence(10, 10, 30).is_empty());
        assert!(slot_sequence(12, 10, 30).is_empty());
        assert!(slot_sequence(6, 24, 0).is_empty());
    }

    #[test]
    fn test_proposed_end_clamps_to_day_end() {
        assert_eq!(proposed_end(time_to_minutes("09:00").unwrap()), 600);
        assert_eq!(minutes_to_time(proposed_end(time_to_minutes("23:30").unwrap())), "24:00");
    }
}
