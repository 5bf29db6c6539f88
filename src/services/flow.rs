use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{
    desk_product_name, month_range, BookingMode, BookingType, ContactForm, FlowSession, FlowShape,
    FlowSnapshot, FlowStep, ProductKind, Room, Schedule, ScheduleUpdate, DESK_COUNT,
};
use crate::services::slots::{minutes_to_time, proposed_end, time_to_minutes};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory flow sessions, one per visitor walking the booking steps.
///
/// Every session sits behind its own lock; mutations take it, and the
/// checkout holds it across its remote calls so payment-affecting requests
/// for one draft never interleave.
#[derive(Clone)]
pub struct FlowService {
    sessions: Arc<Mutex<HashMap<Uuid, Arc<Mutex<FlowSession>>>>>,
    session_ttl: Duration,
}

impl FlowService {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            session_ttl,
        }
    }

    pub async fn create(&self, room: &Room, shape: FlowShape) -> FlowSnapshot {
        let session = FlowSession::new(room.slug.clone(), shape, Utc::now().date_naive());
        let snapshot = session.snapshot();

        let mut sessions = self.sessions.lock().await;
        // Idle sessions are swept on create; expired ids then read as gone.
        let ttl = self.session_ttl;
        sessions.retain(|_, entry| match entry.try_lock() {
            Ok(session) => session.touched_at.elapsed() < ttl,
            Err(_) => true,
        });
        sessions.insert(session.id, Arc::new(Mutex::new(session)));
        snapshot
    }

    /// Look up a live session. Expired or unknown ids are not found.
    pub async fn session(&self, id: Uuid) -> ApiResult<Arc<Mutex<FlowSession>>> {
        let sessions = self.sessions.lock().await;
        let entry = sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Booking flow not found".to_string()))?;
        drop(sessions);

        {
            let session = entry.lock().await;
            if session.touched_at.elapsed() >= self.session_ttl {
                return Err(ApiError::NotFound("Booking flow has expired".to_string()));
            }
        }
        Ok(entry)
    }

    pub async fn snapshot(&self, id: Uuid) -> ApiResult<FlowSnapshot> {
        let entry = self.session(id).await?;
        let session = entry.lock().await;
        Ok(session.snapshot())
    }

    /// Advance one step, clamped at the last step.
    pub async fn next_step(&self, id: Uuid) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            let last = session.shape.steps().len() - 1;
            session.active_step = (session.active_step + 1).min(last);
            Ok(())
        })
        .await
    }

    /// Go back one step, clamped at the first.
    pub async fn prev_step(&self, id: Uuid) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            session.active_step = session.active_step.saturating_sub(1);
            Ok(())
        })
        .await
    }

    /// Jump to an absolute step index, clamped into range. Used by the modal
    /// shortcut that skips the mode step.
    pub async fn jump_step(&self, id: Uuid, step: usize) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            let last = session.shape.steps().len() - 1;
            session.active_step = step.min(last);
            Ok(())
        })
        .await
    }

    /// Restore the initial state: first step, default schedule, cleared
    /// visitor identity. Calling it repeatedly is a no-op.
    pub async fn reset(&self, id: Uuid) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            session.active_step = 0;
            session.mode = None;
            session.schedule = Schedule::default_for(Utc::now().date_naive());
            session.contact = None;
            session.billing = None;
            session.checkout = crate::models::CheckoutState::Idle;
            Ok(())
        })
        .await
    }

    /// Record the visitor-or-account choice. Only valid while the mode step
    /// is active; choosing advances to the details step.
    pub async fn choose_mode(&self, id: Uuid, mode: BookingMode) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            ensure_step(session, FlowStep::Mode)?;
            session.mode = Some(mode);
            session.active_step += 1;
            Ok(())
        })
        .await
    }

    /// Apply a schedule mutation from the details step.
    pub async fn update_schedule(
        &self,
        id: Uuid,
        room: &Room,
        update: ScheduleUpdate,
    ) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            ensure_step(session, FlowStep::Details)?;
            apply_schedule_update(&mut session.schedule, room, update)?;
            // A changed schedule invalidates any intent created for the old
            // amounts; the next checkout begin creates a fresh one.
            if matches!(
                session.checkout,
                crate::models::CheckoutState::PaymentIntent { .. }
                    | crate::models::CheckoutState::SetupIntent { .. }
            ) {
                session.checkout = crate::models::CheckoutState::Idle;
            }
            Ok(())
        })
        .await
    }

    /// Store the visitor's contact and billing details from the contact step.
    pub async fn set_contact(&self, id: Uuid, form: ContactForm) -> ApiResult<FlowSnapshot> {
        self.mutate(id, |session| {
            ensure_step(session, FlowStep::Contact)?;
            let (contact, billing) = form.validate().map_err(ApiError::Validation)?;
            session.contact = Some(contact);
            session.billing = Some(billing);
            Ok(())
        })
        .await
    }

    async fn mutate<F>(&self, id: Uuid, apply: F) -> ApiResult<FlowSnapshot>
    where
        F: FnOnce(&mut FlowSession) -> ApiResult<()>,
    {
        let entry = self.session(id).await?;
        let mut session = entry.lock().await;
        apply(&mut session)?;
        session.touch();
        Ok(session.snapshot())
    }
}

/// Mutations are only accepted from the step that owns the data; a stale
/// write from a step the flow already left is a conflict.
pub fn ensure_step(session: &FlowSession, expected: FlowStep) -> ApiResult<()> {
    let current = session.current_step();
    if current != expected {
        return Err(ApiError::Conflict(format!(
            "The {} step is not active (currently on {})",
            expected, current
        )));
    }
    Ok(())
}

/// Details-step schedule semantics:
/// - picking a start slot proposes an end one hour later unless the update
///   carries its own end;
/// - changing the date aligns `date_to` for hourly rooms;
/// - a desk pick expands the desk number into the product name;
/// - month terms snap to whole months.
pub fn apply_schedule_update(
    schedule: &mut Schedule,
    room: &Room,
    update: ScheduleUpdate,
) -> ApiResult<()> {
    if let Some(start) = &update.start_time {
        let minutes = time_to_minutes(start)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid start time: {}", start)))?;
        schedule.start_time = Some(minutes_to_time(minutes));
        if update.end_time.is_none() {
            schedule.end_time = Some(minutes_to_time(proposed_end(minutes)));
        }
    }
    if let Some(end) = &update.end_time {
        let minutes = time_to_minutes(end)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid end time: {}", end)))?;
        schedule.end_time = Some(minutes_to_time(minutes));
    }

    if let Some(date) = update.date {
        schedule.date = date;
        if room.kind == ProductKind::MeetingRoom {
            schedule.date_to = Some(date);
        }
    }
    if let Some(date_to) = update.date_to {
        if date_to < schedule.date {
            return Err(ApiError::BadRequest(
                "End date must not be before the start date".to_string(),
            ));
        }
        schedule.date_to = Some(date_to);
    }

    if let Some(attendees) = update.attendees {
        schedule.attendees = attendees.max(1);
    }

    if let Some(number) = update.desk_number {
        if room.kind != ProductKind::Desk {
            return Err(ApiError::BadRequest(
                "Desk selection only applies to desk bookings".to_string(),
            ));
        }
        if number < 1 || number > DESK_COUNT {
            return Err(ApiError::BadRequest(format!(
                "Desk number must be between 1 and {}",
                DESK_COUNT
            )));
        }
        schedule.desk_product_name = Some(desk_product_name(number));
    }

    if let Some(booking_type) = update.booking_type {
        schedule.booking_type = Some(booking_type);
    }
    if let Some(months) = update.duration_months {
        if !crate::models::DURATION_OPTIONS.contains(&months) {
            return Err(ApiError::BadRequest(format!(
                "Duration must be one of {:?} months",
                crate::models::DURATION_OPTIONS
            )));
        }
        schedule.duration_months = Some(months);
    }

    // Desk bookings pin the time window to the whole day and derive the date
    // range from the booking type.
    if room.kind == ProductKind::Desk {
        match schedule.booking_type {
            Some(BookingType::Day) => {
                schedule.date_to = Some(schedule.date);
                schedule.start_time = Some("00:00".to_string());
                schedule.end_time = Some("23:59".to_string());
                schedule.duration_months = None;
            }
            Some(BookingType::Month) => {
                let months = schedule.duration_months.unwrap_or(1);
                let (from, to) = month_range(schedule.date, months);
                schedule.date = from;
                schedule.date_to = Some(to);
                schedule.start_time = Some("00:00".to_string());
                schedule.end_time = Some("23:59".to_string());
            }
            None => {}
        }
        schedule.attendees = 1;
    }

    if let Some(note) = update.note {
        schedule.note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceUnit, ProductoRecord};
    use chrono::NaiveDate;

    fn room(kind: ProductKind) -> Room {
        let mut room = Room::from_producto(
            &ProductoRecord {
                name: Some("MA1A1".to_string()),
                tipo: Some("aula".to_string()),
                price_from: Some(35.0),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        room.kind = kind;
        if kind == ProductKind::Desk {
            room.price_unit = PriceUnit::PerMonth;
        }
        room
    }

    fn session(shape: FlowShape) -> FlowSession {
        FlowSession::new(
            "ma1a1".to_string(),
            shape,
            NaiveDate::from_ymd_opt(2024, 6, 18).unwrap(),
        )
    }

    #[test]
    fn test_step_guard_rejects_inactive_steps() {
        let mut s = session(FlowShape::Standard);
        assert!(ensure_step(&s, FlowStep::Details).is_ok());
        s.active_step = 1;
        let err = ensure_step(&s, FlowStep::Details).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_with_mode_shape_starts_on_mode() {
        let s = session(FlowShape::WithMode);
        assert_eq!(s.current_step(), FlowStep::Mode);
        assert_eq!(s.shape.steps().len(), 4);
    }

    #[test]
    fn test_slot_pick_proposes_one_hour_end() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let update = ScheduleUpdate {
            start_time: Some("09:30".to_string()),
            ..Default::default()
        };
        apply_schedule_update(&mut schedule, &room(ProductKind::MeetingRoom), update).unwrap();
        assert_eq!(schedule.start_time.as_deref(), Some("09:30"));
        assert_eq!(schedule.end_time.as_deref(), Some("10:30"));
    }

    #[test]
    fn test_explicit_end_wins_over_proposal() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let update = ScheduleUpdate {
            start_time: Some("09:00".to_string()),
            end_time: Some("12:00".to_string()),
            ..Default::default()
        };
        apply_schedule_update(&mut schedule, &room(ProductKind::MeetingRoom), update).unwrap();
        assert_eq!(schedule.end_time.as_deref(), Some("12:00"));
    }

    #[test]
    fn test_date_change_aligns_date_to() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let new_date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let update = ScheduleUpdate {
            date: Some(new_date),
            ..Default::default()
        };
        apply_schedule_update(&mut schedule, &room(ProductKind::MeetingRoom), update).unwrap();
        assert_eq!(schedule.date_to, Some(new_date));
    }

    #[test]
    fn test_desk_month_snaps_to_whole_months() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        let update = ScheduleUpdate {
            desk_number: Some(3),
            booking_type: Some(BookingType::Month),
            duration_months: Some(3),
            ..Default::default()
        };
        apply_schedule_update(&mut schedule, &room(ProductKind::Desk), update).unwrap();
        assert_eq!(schedule.desk_product_name.as_deref(), Some("MA1O1-3"));
        assert_eq!(schedule.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(
            schedule.date_to,
            Some(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap())
        );
        assert_eq!(schedule.start_time.as_deref(), Some("00:00"));
        assert_eq!(schedule.end_time.as_deref(), Some("23:59"));
    }

    #[test]
    fn test_desk_number_out_of_range_rejected() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let update = ScheduleUpdate {
            desk_number: Some(17),
            booking_type: Some(BookingType::Day),
            ..Default::default()
        };
        let err = apply_schedule_update(&mut schedule, &room(ProductKind::Desk), update).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_attendees_clamp_to_one() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let update = ScheduleUpdate {
            attendees: Some(0),
            ..Default::default()
        };
        apply_schedule_update(&mut schedule, &room(ProductKind::MeetingRoom), update).unwrap();
        assert_eq!(schedule.attendees, 1);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let mut schedule = Schedule::default_for(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let update = ScheduleUpdate {
            duration_months: Some(5),
            ..Default::default()
        };
        assert!(
            apply_schedule_update(&mut schedule, &room(ProductKind::Desk), update).is_err()
        );
    }
}
