use serde::{Deserialize, Serialize};

/// One boundary of the day grid. `id` and `label` are both `HH:MM`; `minutes`
/// is the offset from midnight the services do math with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub label: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Occupied,
}

/// Metadata carried by occupied slots so privileged callers can open the
/// block for editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupiedBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSlot {
    pub id: String,
    pub label: String,
    pub minutes: u32,
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_by: Option<OccupiedBy>,
}

impl GridSlot {
    pub fn available(slot: &TimeSlot) -> Self {
        GridSlot {
            id: slot.id.clone(),
            label: slot.label.clone(),
            minutes: slot.minutes,
            status: SlotStatus::Available,
            occupied_by: None,
        }
    }

    pub fn occupied(slot: &TimeSlot, by: OccupiedBy) -> Self {
        GridSlot {
            id: slot.id.clone(),
            label: slot.label.clone(),
            minutes: slot.minutes,
            status: SlotStatus::Occupied,
            occupied_by: Some(by),
        }
    }
}

/// Free desk numbers for a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskAvailability {
    pub total: u32,
    pub available: Vec<u32>,
    pub booked: Vec<u32>,
}
